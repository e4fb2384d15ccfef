//! Token issuance.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.auth.check_credentials(&req.username, &req.password) {
        warn!(username = %req.username, "login rejected");
        return Err(ApiError::Unauthorized("invalid credentials"));
    }

    let token = state
        .auth
        .issue(&req.username)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;

    info!(username = %req.username, "token issued");
    Ok(Json(LoginResponse { token }))
}

/// Login routes
pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
