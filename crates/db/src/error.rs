//! Typed error type for the db crate.

use thiserror::Error;
use uuid::Uuid;

/// SQLSTATE raised by Postgres for a foreign-key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum DbError {
    /// Opening the pool or the startup liveness probe failed.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// Connection or statement failure.  The surrounding transaction has
    /// been rolled back; nothing was applied.
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The targeted row does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// A write referenced another entity that does not exist.
    #[error("referenced {entity} '{id}' does not exist")]
    MissingReference { entity: &'static str, id: Uuid },

    /// The row was read back but the delete statement removed nothing.
    #[error("no {entity} row deleted for '{id}'")]
    NoRowDeleted { entity: &'static str, id: Uuid },

    /// An engine cannot be deleted while cars still reference it.
    #[error("engine '{id}' is still referenced by {cars} car(s)")]
    EngineInUse { id: Uuid, cars: i64 },

    /// Every statement succeeded but COMMIT did not.  The write may or may
    /// not be durable; verify with a read before retrying.
    #[error("commit failed, outcome unknown: {0}")]
    CommitFailed(#[source] sqlx::Error),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// `true` when the caller cannot know whether the write landed.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::CommitFailed(_))
    }
}

/// Whether `err` is a Postgres foreign-key violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION);
    }
    false
}
