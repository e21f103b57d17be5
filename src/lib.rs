//! Stock Notify — back-in-stock / available-on-request intake with operator email alerts.

pub mod config;
pub mod error;
pub mod notify;
pub mod server;
pub mod store;
pub mod submission;
