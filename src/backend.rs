//! Backend client module
//!
//! Wraps the record-storage service's HTTP surface: credential checks,
//! task listings, the today's-entry probe, daily-entry submission, and the
//! read-only admin queries.

mod client;
pub mod error;
pub mod types;

pub use client::BackendClient;
pub use error::{BackendError, BackendErrorKind};
