//! Error types for the annotation core
//!
//! Four failure classes with distinct recovery policies:
//! resolution errors are reported to the user with no retry, per-record
//! parse and navigation errors are recovered locally by the caller,
//! store errors surface as a notice for explicit user actions only.

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Document link absent or unresolvable from the companion note
    #[error("Could not resolve document: {0}")]
    Resolution(String),

    /// A marker payload that failed to deserialize
    #[error("Malformed annotation marker: {0}")]
    Parse(String),

    /// Renderer navigation to a location token failed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Host store read/write failure
    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
