//! Submission data model — inbound payload, validated record, request type.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// What the shopper asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Notify me when this product is back in stock.
    #[default]
    BackInStock,
    /// This product is only available on request.
    AvailableOnRequest,
}

impl RequestType {
    /// Parse a wire value, falling back to `default` for anything unrecognised.
    pub fn parse_or(value: Option<&str>, default: Self) -> Self {
        match value.map(str::trim) {
            Some("back_in_stock") => Self::BackInStock,
            Some("available_on_request") => Self::AvailableOnRequest,
            Some("") | None => default,
            Some(other) => {
                tracing::debug!(request_type = other, "Unknown request type, using default");
                default
            }
        }
    }

    /// Human-readable label used in notification subjects and bodies.
    pub fn label(self) -> &'static str {
        match self {
            Self::BackInStock => "Back-in-stock request",
            Self::AvailableOnRequest => "Available on Request",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BackInStock => write!(f, "back_in_stock"),
            Self::AvailableOnRequest => write!(f, "available_on_request"),
        }
    }
}

impl std::str::FromStr for RequestType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "back_in_stock" => Ok(Self::BackInStock),
            "available_on_request" => Ok(Self::AvailableOnRequest),
            _ => Err(format!("Unknown request type: {}", s)),
        }
    }
}

/// Raw JSON body posted by the storefront widget.
///
/// Every field is optional on the wire; `validate` decides what is required.
/// Numeric and boolean values are accepted and kept as their string form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionPayload {
    #[serde(default, deserialize_with = "scalar_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub product_title: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub product_handle: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub variant_id: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub store_domain: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub request_type: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub message: Option<String>,
}

/// Accept `null`, strings, numbers and booleans; reject arrays and objects.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, got {other}"
        ))),
    }
}

impl SubmissionPayload {
    /// Check required fields and build an immutable record.
    pub fn validate(self, default_type: RequestType) -> Result<SubmissionRecord, ValidationError> {
        let email = non_empty(self.email);
        let product_id = non_empty(self.product_id);

        let (email, product_id) = match (email, product_id) {
            (Some(email), Some(product_id)) => (email, product_id),
            (email, product_id) => {
                let mut missing = Vec::new();
                if email.is_none() {
                    missing.push("email");
                }
                if product_id.is_none() {
                    missing.push("product_id");
                }
                return Err(ValidationError::MissingRequiredFields { missing });
            }
        };

        Ok(SubmissionRecord {
            id: Uuid::new_v4(),
            email,
            product_id,
            product_title: non_empty(self.product_title),
            product_handle: non_empty(self.product_handle),
            variant_id: non_empty(self.variant_id),
            store_domain: non_empty(self.store_domain),
            request_type: RequestType::parse_or(self.request_type.as_deref(), default_type),
            message: self.message.unwrap_or_default(),
            received_at: Utc::now(),
        })
    }
}

/// A recorded back-in-stock / available-on-request submission.
///
/// Fields are private; once built by [`SubmissionPayload::validate`] a record never changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRecord {
    id: Uuid,
    email: String,
    product_id: String,
    product_title: Option<String>,
    product_handle: Option<String>,
    variant_id: Option<String>,
    store_domain: Option<String>,
    request_type: RequestType,
    message: String,
    received_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn product_title(&self) -> Option<&str> {
        self.product_title.as_deref()
    }

    pub fn product_handle(&self) -> Option<&str> {
        self.product_handle.as_deref()
    }

    pub fn variant_id(&self) -> Option<&str> {
        self.variant_id.as_deref()
    }

    pub fn store_domain(&self) -> Option<&str> {
        self.store_domain.as_deref()
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// Free-text message from the shopper; empty when none was given.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

/// Trim and drop empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
