//! Store traits and their Postgres implementations.
//!
//! Every write runs inside a transaction obtained from [`DbPool::begin`] and
//! released through [`finish`]: commit when the body succeeded, rollback
//! otherwise.  If the caller drops the future mid-flight (deadline,
//! cancellation) the `Transaction` guard is dropped and sqlx rolls it back,
//! so no path leaves a transaction open.  Reads are single statements and
//! run directly on the pool.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::{debug, error, warn};
use uuid::Uuid;

use domain::{Car, CarRequest, Engine, EngineRequest};

use crate::DbError;

pub mod cars;
pub mod engines;

pub use cars::PgCarStore;
pub use engines::PgEngineStore;

/// CRUD over the `engine` table.
#[async_trait]
pub trait EngineStore: Send + Sync {
    /// Fetch one engine; [`DbError::NotFound`] when absent.
    async fn get_engine_by_id(&self, id: Uuid) -> Result<Engine, DbError>;

    /// Mint an id and insert the engine.
    async fn create_engine(&self, req: &EngineRequest) -> Result<Engine, DbError>;

    /// Replace the three magnitudes; [`DbError::NotFound`] when no row matched.
    async fn update_engine(&self, id: Uuid, req: &EngineRequest) -> Result<Engine, DbError>;

    /// Read the engine back, then remove it.  Blocked with
    /// [`DbError::EngineInUse`] while any car references it.
    async fn delete_engine(&self, id: Uuid) -> Result<Engine, DbError>;
}

/// CRUD over the `car` table, enforcing that the referenced engine exists.
#[async_trait]
pub trait CarStore: Send + Sync {
    /// Fetch one car with its engine nested; [`DbError::NotFound`] when absent.
    async fn get_car_by_id(&self, id: Uuid) -> Result<Car, DbError>;

    /// All cars of `brand` in storage order.  Engine fields are nested only
    /// when `include_engine` is set.
    async fn get_cars_by_brand(&self, brand: &str, include_engine: bool) -> Result<Vec<Car>, DbError>;

    /// Insert a car after checking its engine exists
    /// ([`DbError::MissingReference`] otherwise).
    async fn create_car(&self, req: &CarRequest) -> Result<Car, DbError>;

    /// Full replace of the mutable fields; `created_at` is preserved.
    async fn update_car(&self, id: Uuid, req: &CarRequest) -> Result<Car, DbError>;

    /// Read the car back, then remove it.
    async fn delete_car(&self, id: Uuid) -> Result<Car, DbError>;
}

/// Commit `tx` when `outcome` is `Ok`, roll it back otherwise.
///
/// A failed COMMIT is reported as [`DbError::CommitFailed`], never as a
/// plain statement error.
pub(crate) async fn finish<T>(
    tx: Transaction<'static, Postgres>,
    outcome: Result<T, DbError>,
) -> Result<T, DbError> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(|e| {
                error!("transaction commit failed: {e}");
                DbError::CommitFailed(e)
            })?;
            debug!("transaction committed");
            Ok(value)
        }
        Err(err) => {
            warn!("rolling back transaction: {err}");
            if let Err(rb) = tx.rollback().await {
                warn!("rollback failed: {rb}");
            }
            Err(err)
        }
    }
}
