//! SMTP sender — lettre `AsyncSmtpTransport` over implicit TLS or STARTTLS.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use super::{EmailMessage, NotificationSender};
use crate::config::SmtpConfig;
use crate::error::NotificationError;

/// Sends operator emails through a configured SMTP relay.
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpNotificationSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotificationSender")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpNotificationSender {
    /// Build the transport. Fails on a bad relay host or sender address, never touches the network.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| NotificationError::Transport(format!("relay {}: {e}", config.host)))?;

        let mut builder = builder.port(config.port);
        match (&config.username, &config.password) {
            (Some(user), Some(pass)) => {
                builder = builder.credentials(Credentials::new(
                    user.clone(),
                    pass.expose_secret().to_string(),
                ));
            }
            (None, None) => {
                tracing::warn!(host = %config.host, "No SMTP credentials configured, sending unauthenticated");
            }
            _ => {
                return Err(NotificationError::Transport(
                    "SMTP username and password must be set together".into(),
                ));
            }
        }

        let from_address = config
            .from_address
            .as_deref()
            .ok_or_else(|| NotificationError::InvalidAddress {
                address: String::new(),
                reason: "no sender address (set SMTP_FROM or SMTP_USER)".into(),
            })?;
        let address: Address =
            from_address
                .parse()
                .map_err(|e| NotificationError::InvalidAddress {
                    address: from_address.to_string(),
                    reason: format!("{e}"),
                })?;

        Ok(Self {
            transport: builder.build(),
            from: Mailbox::new(Some(config.from_name.clone()), address),
        })
    }

    /// Open a connection to the relay and check it answers.
    pub async fn verify(&self) -> Result<(), NotificationError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(NotificationError::Transport(
                "SMTP server rejected the connection".into(),
            )),
            Err(e) => Err(NotificationError::Transport(format!("{e}"))),
        }
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotificationError::InvalidAddress {
                address: email.to.clone(),
                reason: format!("{e}"),
            })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| NotificationError::Build(format!("{e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("{e}")))?;

        Ok(())
    }
}
