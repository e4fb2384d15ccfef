//! `service` crate: the domain service layer.
//!
//! One service per entity.  Each write validates the request first (no I/O
//! on failure), then delegates to the injected store under a deadline.
//! Services hold no storage logic and no mutable state of their own.

pub mod cars;
pub mod engines;
pub mod error;

use std::future::Future;
use std::time::Duration;

use tracing::warn;

pub use cars::CarService;
pub use engines::EngineService;
pub use error::ServiceError;

/// Tuning knobs shared by both services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on a single store call.
    pub operation_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(5),
        }
    }
}

/// Run a read under `timeout`.  On expiry the call's future is dropped,
/// which aborts the in-flight statement.
pub(crate) async fn with_deadline<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, db::DbError>>,
{
    run_with_deadline(operation, timeout, call, |operation, timeout| {
        ServiceError::DeadlineExceeded { operation, timeout }
    })
    .await
}

/// Run a write under `timeout`.  Expiry may land while COMMIT is in
/// flight, so it is reported as [`ServiceError::WriteOutcomeUnknown`].
pub(crate) async fn with_write_deadline<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, db::DbError>>,
{
    run_with_deadline(operation, timeout, call, |operation, timeout| {
        ServiceError::WriteOutcomeUnknown { operation, timeout }
    })
    .await
}

async fn run_with_deadline<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
    expired: fn(&'static str, Duration) -> ServiceError,
) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, db::DbError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!(operation, ?timeout, "store call exceeded its deadline");
            Err(expired(operation, timeout))
        }
    }
}
