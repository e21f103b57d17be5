//! The persistence seam the handlers see.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::submission::SubmissionRecord;

/// Backend-agnostic, insertion-ordered submission log.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Append a record. Once this returns `Ok`, `list_all` includes it.
    async fn append(&self, record: SubmissionRecord) -> Result<(), StoreError>;

    /// All records, oldest first.
    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StoreError>;
}
