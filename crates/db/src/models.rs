//! Row structs that map 1-to-1 onto query result sets.
//!
//! These are *persistence* models; conversion into the `domain` entities
//! happens here so the stores only ever hand out `domain` types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::{Car, Engine};

// ---------------------------------------------------------------------------
// engine
// ---------------------------------------------------------------------------

/// A persisted engine row.
#[derive(Debug, Clone, FromRow)]
pub struct EngineRow {
    pub id: Uuid,
    pub displacement: f64,
    pub cylinder_count: f64,
    pub range: f64,
}

impl From<EngineRow> for Engine {
    fn from(row: EngineRow) -> Self {
        Engine {
            engine_id: row.id,
            displacement: row.displacement,
            cylinder_count: row.cylinder_count,
            range: row.range,
        }
    }
}

// ---------------------------------------------------------------------------
// car
// ---------------------------------------------------------------------------

/// A persisted car row, without engine columns.
#[derive(Debug, Clone, FromRow)]
pub struct CarRow {
    pub id: Uuid,
    pub name: String,
    pub year: String,
    pub brand: String,
    pub fuel_type: String,
    pub price: f64,
    pub engine_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CarRow {
    pub fn into_car(self, engine: Option<Engine>) -> Car {
        Car {
            id: self.id,
            name: self.name,
            year: self.year,
            brand: self.brand,
            fuel_type: self.fuel_type,
            price: self.price,
            engine_id: self.engine_id,
            engine,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A car row LEFT JOINed with its engine.  Engine columns are aliased with
/// an `e_` prefix and are NULL when the join found nothing.
#[derive(Debug, Clone, FromRow)]
pub struct CarWithEngineRow {
    #[sqlx(flatten)]
    pub car: CarRow,
    pub e_id: Option<Uuid>,
    pub e_displacement: Option<f64>,
    pub e_cylinder_count: Option<f64>,
    pub e_range: Option<f64>,
}

impl From<CarWithEngineRow> for Car {
    fn from(row: CarWithEngineRow) -> Self {
        let engine = match (row.e_id, row.e_displacement, row.e_cylinder_count, row.e_range) {
            (Some(engine_id), Some(displacement), Some(cylinder_count), Some(range)) => Some(Engine {
                engine_id,
                displacement,
                cylinder_count,
                range,
            }),
            _ => None,
        };
        row.car.into_car(engine)
    }
}
