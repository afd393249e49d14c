//! Error types for the utility crate itself.
//!
//! User-facing compilation problems are *diagnostics* and flow through
//! [`crate::ErrorStream`]; the types here cover programmatic misuse of the
//! utility APIs.

use thiserror::Error;

/// Errors from the global intern table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InternError {
    /// A `Name` handle that no interning produced.
    #[error("interned name not found: index {index}")]
    NotFound { index: u32 },
}
