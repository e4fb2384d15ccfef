//! Postgres connection pool.
//!
//! [`Database`] is built once by the composition root, handed (by clone) to
//! every store, and closed once at shutdown.  Stores only borrow the pool;
//! none of them closes or reconfigures it.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::DbError;

/// Type alias for the shared Postgres pool used across the whole application.
pub type DbPool = PgPool;

/// DDL for the `engine` and `car` tables.
pub const SCHEMA: &str = include_str!("../schema.sql");

/// Discrete connection settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Pool ceiling.
    pub max_connections: u32,
    /// How long to wait for a connection before giving up.
    pub connect_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            user: "postgres".into(),
            password: String::new(),
            database: "carzone".into(),
            max_connections: 10,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl DbConfig {
    /// Build driver options field by field; credentials never pass through
    /// a formatted URL.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    /// Connection target with the password masked, for logs.
    pub fn redacted(&self) -> String {
        format!("postgres://{}:***@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

/// The process-wide connection provider.
#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open the pool and verify liveness with a round-trip probe.
    ///
    /// Any failure is returned as [`DbError::Connect`]; the caller must not
    /// start serving traffic.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            target_db = %config.redacted(),
            max_connections = config.max_connections,
            "Connecting to database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(DbError::Connect)?;

        let db = Self { pool };
        db.probe().await.map_err(DbError::Connect)?;

        info!("Successfully connected to database");
        Ok(db)
    }

    /// Wrap an already-open pool (tests, embedding).
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Borrow the shared handle.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// `SELECT 1` against the pool.
    pub async fn ping(&self) -> Result<(), DbError> {
        self.probe().await?;
        Ok(())
    }

    async fn probe(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the `engine` / `car` tables if they do not exist yet.
    pub async fn apply_schema(&self) -> Result<(), DbError> {
        info!("Applying database schema");
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Release every pooled connection.  Best effort: the process is
    /// exiting, so a slow close is only logged.
    pub async fn close(self, grace: Duration) {
        info!("Closing database pool");
        if tokio::time::timeout(grace, self.pool.close()).await.is_err() {
            warn!(?grace, "database pool did not close within the grace period");
        }
    }
}
