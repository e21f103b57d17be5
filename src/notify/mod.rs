//! Operator notifications. One best-effort email per submission.

pub mod compose;
pub mod dispatch;
pub mod noop;
pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{NotifierBackend, ServiceConfig};
use crate::error::{self, NotificationError};

pub use compose::compose;
pub use dispatch::Dispatcher;
pub use noop::NoopNotificationSender;
pub use smtp::SmtpNotificationSender;

/// A fully rendered outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Outbound mail transport.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Make a single delivery attempt.
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}

/// Build the configured sender. With SMTP this also checks the relay answers
/// when `verify_on_startup` is set; any failure here must stop startup.
pub async fn sender_from_config(
    config: &ServiceConfig,
) -> error::Result<Arc<dyn NotificationSender>> {
    match config.backend {
        NotifierBackend::Smtp => {
            let smtp = SmtpNotificationSender::new(&config.smtp)?;
            if config.smtp.verify_on_startup {
                smtp.verify().await?;
                tracing::info!(host = %config.smtp.host, port = config.smtp.port, "SMTP relay verified");
            }
            Ok(Arc::new(smtp))
        }
        NotifierBackend::Noop => Ok(Arc::new(NoopNotificationSender)),
    }
}
