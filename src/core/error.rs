//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components.
///
/// Every failing operation leaves scheduler state untouched, so `release` and
/// `recompute_queue` may be retried freely. A failed `allocate` must be retried only after
/// re-checking availability.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Bed already occupied or otherwise unavailable, or a duplicate open admission.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Unknown bed, ward, admission or patient id.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation attempted on an admission in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Missing or malformed required input.
    #[error("validation error: {0}")]
    Validation(String),
    /// Persistence backend failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
