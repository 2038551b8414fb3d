//! Error types for tysim.

use thiserror::Error;

use crate::ty::UnsupportedKind;

/// Result type for tysim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tysim operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A type construct the engine refuses to approximate (literal, callable,
    /// alias reference, ...). Always recoverable: the repo comparator skips
    /// the affected symbol instead of failing the whole comparison.
    #[error("unsupported type construct: {0}")]
    UnsupportedType(UnsupportedKind),

    /// A type tree that violates the model's construction invariants.
    /// Indicates a bug in the upstream type-extraction layer; fatal to the
    /// call that observed it.
    #[error("malformed type tree: {0}")]
    MalformedInput(String),
}

impl Error {
    /// Create a malformed-input error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }

    /// True for the recoverable skip signal, false for fatal errors.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedType(_))
    }
}
