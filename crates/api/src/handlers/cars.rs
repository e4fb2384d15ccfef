//! Car endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use domain::{Car, CarRequest};

use crate::error::ApiError;
use crate::extract::{ApiJson, ValidUuid};
use crate::AppState;

/// Query string of `GET /cars`.
#[derive(Debug, Default, Deserialize)]
pub struct BrandQuery {
    #[serde(default)]
    pub brand: String,
    /// Only the literal `true` joins the engine.
    #[serde(default, rename = "isEngine")]
    pub is_engine: Option<String>,
}

impl BrandQuery {
    fn include_engine(&self) -> bool {
        self.is_engine.as_deref() == Some("true")
    }
}

/// GET /cars/{id}
async fn get_car(
    State(state): State<AppState>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Car>, ApiError> {
    Ok(Json(state.cars.get_car_by_id(id).await?))
}

/// GET /cars?brand=&isEngine=
async fn list_by_brand(
    State(state): State<AppState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = state
        .cars
        .get_cars_by_brand(&query.brand, query.include_engine())
        .await?;
    Ok(Json(cars))
}

/// POST /cars
async fn create_car(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CarRequest>,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    let car = state.cars.create_car(&req).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

/// PUT /cars/{id}
async fn update_car(
    State(state): State<AppState>,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<CarRequest>,
) -> Result<Json<Car>, ApiError> {
    Ok(Json(state.cars.update_car(id, &req).await?))
}

/// DELETE /cars/{id}
async fn delete_car(
    State(state): State<AppState>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Car>, ApiError> {
    Ok(Json(state.cars.delete_car(id).await?))
}

/// Car routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_by_brand).post(create_car))
        .route("/cars/{id}", get(get_car).put(update_car).delete(delete_car))
}
