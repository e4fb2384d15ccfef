//! `domain` crate: entities, write requests and request validation.
//!
//! Everything here is pure: no I/O, no async, no database types.  The `db`
//! crate persists these types and the `service` crate validates requests
//! with [`validate_car_request`] / [`validate_engine_request`] before any
//! store call is made.

pub mod models;
pub mod validation;

pub use models::{Car, CarRequest, Engine, EngineRequest, FuelType};
pub use validation::{
    validate_car_request, validate_car_request_at, validate_engine_request, ValidationError,
};
