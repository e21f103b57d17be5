//! Submission intake — data model and HTTP routes.

pub mod model;
pub mod routes;

pub use model::{RequestType, SubmissionPayload, SubmissionRecord};
pub use routes::{AppState, submission_routes};
