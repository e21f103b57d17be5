//! Fire-and-forget dispatch of operator notifications.
//!
//! Each submission gets one best-effort send on its own tokio task. Failures are
//! logged and dropped; nothing is retried and nothing reaches the HTTP caller.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{NotificationSender, compose};
use crate::submission::SubmissionRecord;

/// Hands composed emails to a sender, off the request path.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn NotificationSender>,
    to: String,
}

impl Dispatcher {
    /// `to` is the fixed operator address every notification goes to.
    pub fn new(sender: Arc<dyn NotificationSender>, to: impl Into<String>) -> Self {
        Self {
            sender,
            to: to.into(),
        }
    }

    /// Spawn the delivery attempt and return immediately.
    ///
    /// The handle resolves to whether the send succeeded; callers on the request
    /// path drop it.
    pub fn dispatch(&self, record: SubmissionRecord) -> JoinHandle<bool> {
        let this = self.clone();
        tokio::spawn(async move { this.deliver(&record).await })
    }

    /// Make one delivery attempt and wait for it. Returns `true` on success.
    pub async fn deliver(&self, record: &SubmissionRecord) -> bool {
        let email = compose(record, &self.to);
        let label = record.request_type().label();

        match self.sender.send_email(&email).await {
            Ok(()) => {
                info!(
                    submission_id = %record.id(),
                    to = %self.to,
                    "{label} email sent"
                );
                true
            }
            Err(e) => {
                error!(
                    submission_id = %record.id(),
                    error = %e,
                    "Failed to send {label} email"
                );
                false
            }
        }
    }
}
