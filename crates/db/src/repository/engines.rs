//! Engine CRUD operations.

use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use domain::{Engine, EngineRequest};

use super::{finish, EngineStore};
use crate::error::is_foreign_key_violation;
use crate::models::EngineRow;
use crate::{Database, DbError, DbPool};

/// Postgres-backed [`EngineStore`].
#[derive(Debug, Clone)]
pub struct PgEngineStore {
    pool: DbPool,
}

impl PgEngineStore {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

#[async_trait]
impl EngineStore for PgEngineStore {
    async fn get_engine_by_id(&self, id: Uuid) -> Result<Engine, DbError> {
        let row = sqlx::query_as::<_, EngineRow>(
            r#"SELECT id, displacement, cylinder_count, "range" FROM engine WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { entity: "engine", id })?;

        Ok(row.into())
    }

    async fn create_engine(&self, req: &EngineRequest) -> Result<Engine, DbError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;
        let outcome = insert_engine(&mut tx, id, req).await;
        let engine = finish(tx, outcome).await?;

        debug!(engine_id = %id, "engine created");
        Ok(engine)
    }

    async fn update_engine(&self, id: Uuid, req: &EngineRequest) -> Result<Engine, DbError> {
        let mut tx = self.pool.begin().await?;
        let outcome = update_engine_row(&mut tx, id, req).await;
        finish(tx, outcome).await
    }

    async fn delete_engine(&self, id: Uuid) -> Result<Engine, DbError> {
        let mut tx = self.pool.begin().await?;
        let outcome = delete_engine_row(&mut tx, id).await;
        finish(tx, outcome).await
    }
}

async fn insert_engine(conn: &mut PgConnection, id: Uuid, req: &EngineRequest) -> Result<Engine, DbError> {
    sqlx::query(
        r#"
        INSERT INTO engine (id, displacement, cylinder_count, "range")
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(req.displacement)
    .bind(req.cylinder_count)
    .bind(req.range)
    .execute(&mut *conn)
    .await?;

    Ok(req.clone().into_engine(id))
}

async fn update_engine_row(conn: &mut PgConnection, id: Uuid, req: &EngineRequest) -> Result<Engine, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE engine
        SET displacement = $2, cylinder_count = $3, "range" = $4
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(req.displacement)
    .bind(req.cylinder_count)
    .bind(req.range)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound { entity: "engine", id });
    }

    Ok(req.clone().into_engine(id))
}

async fn delete_engine_row(conn: &mut PgConnection, id: Uuid) -> Result<Engine, DbError> {
    let engine: Engine = sqlx::query_as::<_, EngineRow>(
        r#"SELECT id, displacement, cylinder_count, "range" FROM engine WHERE id = $1 FOR UPDATE"#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(DbError::NotFound { entity: "engine", id })?
    .into();

    let cars: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM car WHERE engine_id = $1")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if cars > 0 {
        return Err(DbError::EngineInUse { id, cars });
    }

    // A car inserted after the count is still caught by the FK constraint.
    let result = sqlx::query("DELETE FROM engine WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DbError::EngineInUse { id, cars: 1 }
            } else {
                DbError::Sqlx(e)
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(DbError::NoRowDeleted { entity: "engine", id });
    }

    Ok(engine)
}
