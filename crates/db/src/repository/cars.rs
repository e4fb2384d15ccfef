//! Car CRUD operations.
//!
//! Writes lock the referenced engine row `FOR SHARE` before touching `car`,
//! so the engine cannot be deleted between the existence check and the
//! insert/update.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use domain::{Car, CarRequest, Engine};

use super::{finish, CarStore};
use crate::error::is_foreign_key_violation;
use crate::models::{CarRow, CarWithEngineRow, EngineRow};
use crate::{Database, DbError, DbPool};

/// Postgres-backed [`CarStore`].
#[derive(Debug, Clone)]
pub struct PgCarStore {
    pool: DbPool,
}

impl PgCarStore {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

#[async_trait]
impl CarStore for PgCarStore {
    async fn get_car_by_id(&self, id: Uuid) -> Result<Car, DbError> {
        let row = sqlx::query_as::<_, CarWithEngineRow>(
            r#"
            SELECT c.id, c.name, c.year, c.brand, c.fuel_type, c.price, c.engine_id,
                   c.created_at, c.updated_at,
                   e.id AS e_id, e.displacement AS e_displacement,
                   e.cylinder_count AS e_cylinder_count, e."range" AS e_range
            FROM car c
            LEFT JOIN engine e ON c.engine_id = e.id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { entity: "car", id })?;

        Ok(row.into())
    }

    async fn get_cars_by_brand(&self, brand: &str, include_engine: bool) -> Result<Vec<Car>, DbError> {
        if include_engine {
            let rows = sqlx::query_as::<_, CarWithEngineRow>(
                r#"
                SELECT c.id, c.name, c.year, c.brand, c.fuel_type, c.price, c.engine_id,
                       c.created_at, c.updated_at,
                       e.id AS e_id, e.displacement AS e_displacement,
                       e.cylinder_count AS e_cylinder_count, e."range" AS e_range
                FROM car c
                LEFT JOIN engine e ON c.engine_id = e.id
                WHERE c.brand = $1
                "#,
            )
            .bind(brand)
            .fetch_all(&self.pool)
            .await?;

            return Ok(rows.into_iter().map(Car::from).collect());
        }

        let rows = sqlx::query_as::<_, CarRow>(
            r#"
            SELECT id, name, year, brand, fuel_type, price, engine_id, created_at, updated_at
            FROM car
            WHERE brand = $1
            "#,
        )
        .bind(brand)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into_car(None)).collect())
    }

    async fn create_car(&self, req: &CarRequest) -> Result<Car, DbError> {
        let mut tx = self.pool.begin().await?;
        let outcome = insert_car(&mut tx, req).await;
        let car = finish(tx, outcome).await?;

        debug!(car_id = %car.id, engine_id = %car.engine_id, "car created");
        Ok(car)
    }

    async fn update_car(&self, id: Uuid, req: &CarRequest) -> Result<Car, DbError> {
        let mut tx = self.pool.begin().await?;
        let outcome = update_car_row(&mut tx, id, req).await;
        finish(tx, outcome).await
    }

    async fn delete_car(&self, id: Uuid) -> Result<Car, DbError> {
        let mut tx = self.pool.begin().await?;
        let outcome = delete_car_row(&mut tx, id).await;
        finish(tx, outcome).await
    }
}

/// Read the referenced engine and hold a share lock on it for the rest of
/// the transaction.
async fn lock_engine(conn: &mut PgConnection, engine_id: Uuid) -> Result<Engine, DbError> {
    let row = sqlx::query_as::<_, EngineRow>(
        r#"SELECT id, displacement, cylinder_count, "range" FROM engine WHERE id = $1 FOR SHARE"#,
    )
    .bind(engine_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(DbError::MissingReference { entity: "engine", id: engine_id })?;

    Ok(row.into())
}

fn car_write_error(err: sqlx::Error, engine_id: Uuid) -> DbError {
    if is_foreign_key_violation(&err) {
        DbError::MissingReference { entity: "engine", id: engine_id }
    } else {
        DbError::Sqlx(err)
    }
}

async fn insert_car(conn: &mut PgConnection, req: &CarRequest) -> Result<Car, DbError> {
    let engine_id = req.engine.engine_id;
    let engine = lock_engine(conn, engine_id).await?;

    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, CarRow>(
        r#"
        INSERT INTO car (id, name, year, brand, fuel_type, price, engine_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING id, name, year, brand, fuel_type, price, engine_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.year)
    .bind(&req.brand)
    .bind(&req.fuel_type)
    .bind(req.price)
    .bind(engine_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| car_write_error(e, engine_id))?;

    Ok(row.into_car(Some(engine)))
}

async fn update_car_row(conn: &mut PgConnection, id: Uuid, req: &CarRequest) -> Result<Car, DbError> {
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM car WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    if exists.is_none() {
        return Err(DbError::NotFound { entity: "car", id });
    }

    let engine_id = req.engine.engine_id;
    let engine = lock_engine(conn, engine_id).await?;

    let row = sqlx::query_as::<_, CarRow>(
        r#"
        UPDATE car
        SET name = $2, year = $3, brand = $4, fuel_type = $5, price = $6,
            engine_id = $7, updated_at = $8
        WHERE id = $1
        RETURNING id, name, year, brand, fuel_type, price, engine_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.year)
    .bind(&req.brand)
    .bind(&req.fuel_type)
    .bind(req.price)
    .bind(engine_id)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| car_write_error(e, engine_id))?
    .ok_or(DbError::NotFound { entity: "car", id })?;

    Ok(row.into_car(Some(engine)))
}

async fn delete_car_row(conn: &mut PgConnection, id: Uuid) -> Result<Car, DbError> {
    let car: Car = sqlx::query_as::<_, CarWithEngineRow>(
        r#"
        SELECT c.id, c.name, c.year, c.brand, c.fuel_type, c.price, c.engine_id,
               c.created_at, c.updated_at,
               e.id AS e_id, e.displacement AS e_displacement,
               e.cylinder_count AS e_cylinder_count, e."range" AS e_range
        FROM car c
        LEFT JOIN engine e ON c.engine_id = e.id
        WHERE c.id = $1
        FOR UPDATE OF c
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(DbError::NotFound { entity: "car", id })?
    .into();

    let result = sqlx::query("DELETE FROM car WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NoRowDeleted { entity: "car", id });
    }

    Ok(car)
}
