//! Engine endpoints.

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};

use domain::{Engine, EngineRequest};

use crate::error::ApiError;
use crate::extract::{ApiJson, ValidUuid};
use crate::AppState;

/// GET /engine/{id}
async fn get_engine(
    State(state): State<AppState>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Engine>, ApiError> {
    Ok(Json(state.engines.get_engine_by_id(id).await?))
}

/// POST /engine
async fn create_engine(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EngineRequest>,
) -> Result<(StatusCode, Json<Engine>), ApiError> {
    let engine = state.engines.create_engine(&req).await?;
    Ok((StatusCode::CREATED, Json(engine)))
}

/// PUT /engine/{id}
async fn update_engine(
    State(state): State<AppState>,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<EngineRequest>,
) -> Result<Json<Engine>, ApiError> {
    Ok(Json(state.engines.update_engine(id, &req).await?))
}

/// DELETE /engine/{id}
async fn delete_engine(
    State(state): State<AppState>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Engine>, ApiError> {
    Ok(Json(state.engines.delete_engine(id).await?))
}

/// Engine routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/engine", post(create_engine))
        .route("/engine/{id}", get(get_engine).put(update_engine).delete(delete_engine))
}
