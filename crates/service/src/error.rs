//! Service-level error types.

use std::time::Duration;

use thiserror::Error;

use domain::ValidationError;

/// Errors produced by the car and engine services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was rejected before any store call.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence error from the db crate.
    #[error("database error: {0}")]
    Database(#[from] db::DbError),

    /// A read did not finish in time.  Nothing was written.
    #[error("{operation} exceeded its {timeout:?} deadline")]
    DeadlineExceeded {
        operation: &'static str,
        timeout: Duration,
    },

    /// A write did not finish in time.  Its transaction was dropped, but if
    /// COMMIT was already sent the write may still be durable; read it back
    /// before retrying.
    #[error("{operation} exceeded its {timeout:?} deadline, outcome unknown")]
    WriteOutcomeUnknown {
        operation: &'static str,
        timeout: Duration,
    },
}

impl ServiceError {
    /// `true` when the caller cannot know whether the write landed.
    pub fn is_ambiguous(&self) -> bool {
        match self {
            Self::WriteOutcomeUnknown { .. } => true,
            Self::Database(e) => e.is_ambiguous(),
            Self::Validation(_) | Self::DeadlineExceeded { .. } => false,
        }
    }
}
