//! Error types for the caution engine.
//!
//! Ordinary rule failures are never errors: they are recorded as warnings.
//! The variants below cover the few outcomes that must interrupt the caller,
//! either at type-definition time (bad configuration) or during a run.

use thiserror::Error;

/// The unified error type for the caution workspace.
#[derive(Debug, Error)]
pub enum CautionError {
    /// A rule declaration or rule-set document is malformed.
    ///
    /// Raised while a registry is being built. Treated as fatal: it marks a
    /// programming error in the model definition, not a runtime condition.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The record cannot perform the requested operation, e.g. raw-payload
    /// extraction on a record that carries no raw payload.
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// A warning declared `strict` was raised instead of being stored.
    #[error("strict caution failed on '{attribute}': {message}")]
    StrictWarning { attribute: String, message: String },

    /// `ensure_safe` found warnings after a full run.
    ///
    /// `warnings` holds every rendered full message in insertion order.
    #[error("{message}")]
    Unsafe { message: String, warnings: Vec<String> },

    /// A host callback (before/after/caution method) failed.
    #[error("callback '{name}' failed: {reason}")]
    Callback { name: String, reason: String },
}

/// Convenience alias used throughout the caution crates.
pub type CautionResult<T> = Result<T, CautionError>;

impl CautionError {
    /// Shorthand for building a `ConfigError`.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }
}
