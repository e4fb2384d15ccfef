//! Write-request validation.
//!
//! Checks run in a fixed order and stop at the first failure; callers get a
//! single [`ValidationError`] naming the offending field, never an aggregate.

use chrono::{Datelike, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CarRequest, Engine, EngineRequest, FuelType};

/// Year the first production automobile was built.
pub const FIRST_CAR_YEAR: i32 = 1886;

/// Errors produced by request validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A mandatory field is empty or nil.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// The year is not four ASCII digits.
    #[error("year must be a 4-digit number, got '{0}'")]
    YearNotNumeric(String),

    /// The year is outside `[min, max]`.
    #[error("year must be between {min} and {max}, got {year}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    /// The fuel type is not one of petrol, diesel, electric, hybrid.
    #[error("not a valid fuel type: '{0}'")]
    InvalidFuelType(String),

    /// A magnitude or price is zero, negative or NaN.
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

impl ValidationError {
    /// Name of the field that failed.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::NotPositive { field } => field,
            Self::YearNotNumeric(_) | Self::YearOutOfRange { .. } => "year",
            Self::InvalidFuelType(_) => "fuel_type",
        }
    }
}

/// Validate a car request against the current calendar year.
pub fn validate_car_request(req: &CarRequest) -> Result<(), ValidationError> {
    validate_car_request_at(req, Utc::now().year())
}

/// Validate a car request with an explicit upper bound for the year.
///
/// Order: name → year → fuel type → engine → price → brand.
pub fn validate_car_request_at(req: &CarRequest, current_year: i32) -> Result<(), ValidationError> {
    validate_name(&req.name)?;
    validate_year(&req.year, current_year)?;
    validate_fuel_type(&req.fuel_type)?;
    validate_engine(&req.engine)?;
    positive("price", req.price)?;
    if req.brand.is_empty() {
        return Err(ValidationError::Required { field: "brand" });
    }
    Ok(())
}

/// Validate an engine request: displacement → cylinder count → range.
pub fn validate_engine_request(req: &EngineRequest) -> Result<(), ValidationError> {
    validate_magnitudes(req.displacement, req.cylinder_count, req.range)
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }
    Ok(())
}

fn validate_year(year: &str, current_year: i32) -> Result<(), ValidationError> {
    if year.is_empty() {
        return Err(ValidationError::Required { field: "year" });
    }

    let not_numeric = || ValidationError::YearNotNumeric(year.to_owned());
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_numeric());
    }
    let parsed: i32 = year.parse().map_err(|_| not_numeric())?;

    if !(FIRST_CAR_YEAR..=current_year).contains(&parsed) {
        return Err(ValidationError::YearOutOfRange {
            year: parsed,
            min: FIRST_CAR_YEAR,
            max: current_year,
        });
    }
    Ok(())
}

fn validate_fuel_type(fuel_type: &str) -> Result<(), ValidationError> {
    if fuel_type.is_empty() {
        return Err(ValidationError::Required { field: "fuel_type" });
    }
    fuel_type
        .parse::<FuelType>()
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidFuelType(fuel_type.to_owned()))
}

fn validate_engine(engine: &Engine) -> Result<(), ValidationError> {
    if engine.engine_id == Uuid::nil() {
        return Err(ValidationError::Required { field: "engine_id" });
    }
    validate_magnitudes(engine.displacement, engine.cylinder_count, engine.range)
}

fn validate_magnitudes(displacement: f64, cylinder_count: f64, range: f64) -> Result<(), ValidationError> {
    positive("displacement", displacement)?;
    positive("cylinder_count", cylinder_count)?;
    positive("range", range)
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(())
}
