//! Noop sender — logs instead of sending. Used when notifications are disabled.

use async_trait::async_trait;

use super::{EmailMessage, NotificationSender};
use crate::error::NotificationError;

/// Sender that only logs.
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Noop: skipping email send"
        );
        Ok(())
    }
}
