//! Persistence layer — submission log behind a trait.

pub mod memory;
pub mod traits;

pub use memory::InMemoryStore;
pub use traits::SubmissionStore;
