//! Configuration types, built from environment variables.

use std::net::IpAddr;

use lettre::message::Mailbox;
use secrecy::SecretString;

use crate::error::ConfigError;
use crate::submission::RequestType;

/// Default operator mailbox when `TO_EMAIL` is unset.
pub const DEFAULT_TO_EMAIL: &str = "stock-requests@example.com";

/// SMTP transport settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise.
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from_address: Option<String>,
    pub from_name: String,
    /// Check the relay answers before accepting traffic.
    pub verify_on_startup: bool,
}

/// Which sender backs the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierBackend {
    Smtp,
    Noop,
}

/// How the intake handler relates to the notification send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Respond `{success, queued}` and send in the background.
    #[default]
    Queued,
    /// Wait for the single send attempt and respond `{success, emailed}`.
    Await,
}

/// Allowed CORS origins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Reflect whatever `Origin` the request carries.
    #[default]
    Mirror,
    /// `Access-Control-Allow-Origin: *`.
    Any,
    /// Only these exact origins.
    List(Vec<String>),
}

/// Request-handling settings shared by the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct IntakeConfig {
    pub delivery_mode: DeliveryMode,
    pub default_request_type: RequestType,
    pub cors_origins: CorsOrigins,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Operator mailbox; always a parseable address.
    pub to_email: String,
    pub backend: NotifierBackend,
    pub smtp: SmtpConfig,
    pub intake: IntakeConfig,
}

impl ServiceConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_or(&get, "PORT", 3000u16)?;
        let bind_address = parse_or(&get, "BIND_ADDRESS", IpAddr::from([0, 0, 0, 0]))?;

        let username = get("SMTP_USER");
        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: parse_or(&get, "SMTP_PORT", 465u16)?,
            secure: parse_bool(&get, "SMTP_SECURE", true)?,
            password: get("SMTP_PASS").map(SecretString::from),
            from_address: get("SMTP_FROM").or_else(|| username.clone()),
            username,
            from_name: get("SMTP_FROM_NAME").unwrap_or_else(|| "Stock Requests".to_string()),
            verify_on_startup: parse_bool(&get, "SMTP_VERIFY_ON_STARTUP", true)?,
        };

        let backend = match get("NOTIFIER_BACKEND").as_deref() {
            None | Some("smtp") => NotifierBackend::Smtp,
            Some("noop") => NotifierBackend::Noop,
            Some(other) => {
                return Err(invalid("NOTIFIER_BACKEND", format!("expected smtp or noop, got {other}")));
            }
        };

        if backend == NotifierBackend::Smtp {
            match (&smtp.username, &smtp.password) {
                (Some(_), None) => {
                    return Err(invalid("SMTP_PASS", "SMTP_USER is set but SMTP_PASS is not".into()));
                }
                (None, Some(_)) => {
                    return Err(invalid("SMTP_USER", "SMTP_PASS is set but SMTP_USER is not".into()));
                }
                _ => {}
            }
        }

        let to_email = get("TO_EMAIL").unwrap_or_else(|| DEFAULT_TO_EMAIL.to_string());
        if let Err(e) = to_email.parse::<Mailbox>() {
            return Err(invalid("TO_EMAIL", format!("{to_email}: {e}")));
        }

        let delivery_mode = match get("DELIVERY_MODE").as_deref() {
            None | Some("queued") => DeliveryMode::Queued,
            Some("await") => DeliveryMode::Await,
            Some(other) => {
                return Err(invalid("DELIVERY_MODE", format!("expected queued or await, got {other}")));
            }
        };

        let default_request_type = match get("DEFAULT_REQUEST_TYPE") {
            None => RequestType::default(),
            Some(value) => value
                .parse()
                .map_err(|e: String| invalid("DEFAULT_REQUEST_TYPE", e))?,
        };

        let cors_origins = parse_cors_origins(get("CORS_ALLOWED_ORIGINS").as_deref());

        Ok(Self {
            bind_address,
            port,
            to_email,
            backend,
            smtp,
            intake: IntakeConfig {
                delivery_mode,
                default_request_type,
                cors_origins,
            },
        })
    }
}

/// `mirror` (or unset) reflects the origin, `*` anywhere allows any, otherwise a comma-separated list.
pub fn parse_cors_origins(value: Option<&str>) -> CorsOrigins {
    match value.map(str::trim) {
        None | Some("") | Some("mirror") => CorsOrigins::Mirror,
        Some(list) => {
            let origins: Vec<String> = list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if origins.iter().any(|o| o == "*") {
                CorsOrigins::Any
            } else {
                CorsOrigins::List(origins)
            }
        }
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| invalid(key, format!("{raw}: {e}"))),
    }
}

fn parse_bool<F>(get: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_lowercase()).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(invalid(key, format!("expected a boolean, got {other}"))),
    }
}

fn invalid(key: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.secure);
        assert!(config.smtp.username.is_none());
        assert!(config.smtp.from_address.is_none());
        assert_eq!(config.smtp.from_name, "Stock Requests");
        assert_eq!(config.to_email, DEFAULT_TO_EMAIL);
        assert_eq!(config.backend, NotifierBackend::Smtp);
        assert_eq!(config.intake.delivery_mode, DeliveryMode::Queued);
        assert_eq!(config.intake.default_request_type, RequestType::BackInStock);
        assert_eq!(config.intake.cors_origins, CorsOrigins::Mirror);
    }

    #[test]
    fn from_falls_back_to_user() {
        let config = from_pairs(&[("SMTP_USER", "shop@gmail.com"), ("SMTP_PASS", "secret")]).unwrap();
        assert_eq!(config.smtp.from_address.as_deref(), Some("shop@gmail.com"));
        assert_eq!(
            config.smtp.password.as_ref().map(|p| p.expose_secret().to_string()),
            Some("secret".to_string())
        );

        let config = from_pairs(&[
            ("SMTP_USER", "shop@gmail.com"),
            ("SMTP_PASS", "secret"),
            ("SMTP_FROM", "noreply@shop.com"),
        ])
        .unwrap();
        assert_eq!(config.smtp.from_address.as_deref(), Some("noreply@shop.com"));
    }

    #[test]
    fn password_is_redacted_in_debug() {
        let config = from_pairs(&[("SMTP_USER", "shop@gmail.com"), ("SMTP_PASS", "hunter2")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("SMTP_PORT", "587"),
            ("SMTP_SECURE", "false"),
            ("TO_EMAIL", "ops@shop.com"),
            ("NOTIFIER_BACKEND", "noop"),
            ("DELIVERY_MODE", "await"),
            ("DEFAULT_REQUEST_TYPE", "available_on_request"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.smtp.port, 587);
        assert!(!config.smtp.secure);
        assert_eq!(config.to_email, "ops@shop.com");
        assert_eq!(config.backend, NotifierBackend::Noop);
        assert_eq!(config.intake.delivery_mode, DeliveryMode::Await);
        assert_eq!(
            config.intake.default_request_type,
            RequestType::AvailableOnRequest
        );
    }

    #[test]
    fn malformed_operator_address_is_an_error() {
        let err = from_pairs(&[("TO_EMAIL", "not-an-address")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "TO_EMAIL"));

        let config = from_pairs(&[("TO_EMAIL", "Ops <ops@shop.com>")]).unwrap();
        assert_eq!(config.to_email, "Ops <ops@shop.com>");
    }

    #[test]
    fn half_configured_credentials_are_an_error() {
        let err = from_pairs(&[("SMTP_USER", "shop@gmail.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SMTP_PASS"));

        let err = from_pairs(&[("SMTP_PASS", "secret")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SMTP_USER"));

        // noop never authenticates
        assert!(from_pairs(&[("SMTP_USER", "shop@gmail.com"), ("NOTIFIER_BACKEND", "noop")]).is_ok());
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = from_pairs(&[("SMTP_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SMTP_PORT"));
    }

    #[test]
    fn invalid_enum_values_are_errors() {
        assert!(from_pairs(&[("DELIVERY_MODE", "later")]).is_err());
        assert!(from_pairs(&[("NOTIFIER_BACKEND", "ses")]).is_err());
        assert!(from_pairs(&[("SMTP_SECURE", "maybe")]).is_err());
        assert!(from_pairs(&[("DEFAULT_REQUEST_TYPE", "preorder")]).is_err());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = from_pairs(&[("PORT", ""), ("SMTP_HOST", "  ")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.smtp.host, "smtp.gmail.com");
    }

    #[test]
    fn cors_origin_parsing() {
        assert_eq!(parse_cors_origins(None), CorsOrigins::Mirror);
        assert_eq!(parse_cors_origins(Some("mirror")), CorsOrigins::Mirror);
        assert_eq!(parse_cors_origins(Some("*")), CorsOrigins::Any);
        assert_eq!(parse_cors_origins(Some("https://a.com,*")), CorsOrigins::Any);
        assert_eq!(
            parse_cors_origins(Some("https://a.com, https://b.com,")),
            CorsOrigins::List(vec!["https://a.com".into(), "https://b.com".into()])
        );
    }
}
