//! Domain entities and the request shapes used to create or replace them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// engine
// ---------------------------------------------------------------------------

/// A power unit.  `engine_id` is minted by the store and never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engine {
    pub engine_id: Uuid,
    pub displacement: f64,
    /// Numeric rather than integral; kept as `f64` end to end.
    pub cylinder_count: f64,
    pub range: f64,
}

/// Body of an engine create / update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineRequest {
    pub displacement: f64,
    pub cylinder_count: f64,
    pub range: f64,
}

impl EngineRequest {
    /// Materialise the entity for a freshly minted (or existing) id.
    pub fn into_engine(self, engine_id: Uuid) -> Engine {
        Engine {
            engine_id,
            displacement: self.displacement,
            cylinder_count: self.cylinder_count,
            range: self.range,
        }
    }
}

// ---------------------------------------------------------------------------
// car
// ---------------------------------------------------------------------------

/// Allowed values of `Car::fuel_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl FuelType {
    pub const ALL: [FuelType; 4] = [Self::Petrol, Self::Diesel, Self::Electric, Self::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Petrol => "petrol",
            Self::Diesel => "diesel",
            Self::Electric => "electric",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FuelType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "petrol"   => Ok(Self::Petrol),
            "diesel"   => Ok(Self::Diesel),
            "electric" => Ok(Self::Electric),
            "hybrid"   => Ok(Self::Hybrid),
            other      => Err(format!("unknown fuel type: {other}")),
        }
    }
}

/// A vehicle record.
///
/// `engine` is populated when the read joined the engine table; projections
/// that skip the join leave it `None` and only carry `engine_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: Uuid,
    pub name: String,
    /// Four-digit year kept as text, the way it was submitted.
    pub year: String,
    pub brand: String,
    pub fuel_type: String,
    pub price: f64,
    pub engine_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<Engine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a car create / update (full replace of the mutable fields).
///
/// `engine` carries the referenced engine's id plus its magnitudes; the
/// magnitudes are validated but the stored engine row stays authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarRequest {
    pub name: String,
    pub year: String,
    pub brand: String,
    pub fuel_type: String,
    pub price: f64,
    pub engine: Engine,
}
