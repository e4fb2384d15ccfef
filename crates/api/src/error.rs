//! API error type with automatic HTTP status mapping.
//!
//! Bodies are `{"error": "<kind>", "message": "<text>"}`.  Storage and
//! internal failures are logged and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use db::DbError;
use domain::ValidationError;
use service::ServiceError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, query or path (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failure (400).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Missing or invalid bearer token, wrong credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Target id does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Referenced entity does not exist (422).
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// Write conflicts with existing data (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store call exceeded its deadline (504).
    #[error("timeout: {0}")]
    Timeout(String),

    /// Commit outcome unknown (500, but distinguishable).
    #[error("commit outcome unknown: {0}")]
    Ambiguous(String),

    /// Anything else (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => Self::Validation(e),
            ServiceError::DeadlineExceeded { .. } => Self::Timeout(err.to_string()),
            ServiceError::WriteOutcomeUnknown { .. } => Self::Ambiguous(err.to_string()),
            ServiceError::Database(e) => e.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } | DbError::NoRowDeleted { .. } => Self::NotFound(err.to_string()),
            DbError::MissingReference { .. } => Self::MissingReference(err.to_string()),
            DbError::EngineInUse { .. } => Self::Conflict(err.to_string()),
            DbError::CommitFailed(_) => Self::Ambiguous(err.to_string()),
            DbError::Connect(_) | DbError::Sqlx(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "bad_request", "message": msg }),
            ),
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation_error", "field": e.field(), "message": e.to_string() }),
            ),
            Self::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "unauthorized", "message": msg }),
            ),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": msg }),
            ),
            Self::MissingReference(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "missing_reference", "message": msg }),
            ),
            Self::Conflict(msg) => (
                StatusCode::CONFLICT,
                json!({ "error": "conflict", "message": msg }),
            ),
            Self::Timeout(msg) => {
                tracing::warn!("Timeout: {}", msg);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    json!({ "error": "timeout", "message": msg }),
                )
            }
            Self::Ambiguous(msg) => {
                tracing::error!("Ambiguous commit: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "commit_outcome_unknown",
                        "message": "the write may or may not have been applied; read it back before retrying"
                    }),
                )
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal_error", "message": "an internal error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn validation_error_is_400() {
        let err = ValidationError::Required { field: "name" };
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_map_to_distinct_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(status_of(DbError::NotFound { entity: "car", id }), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DbError::NoRowDeleted { entity: "car", id }), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(DbError::MissingReference { entity: "engine", id }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(DbError::EngineInUse { id, cars: 2 }), StatusCode::CONFLICT);
        assert_eq!(
            status_of(DbError::CommitFailed(sqlx_pool_closed())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn deadline_is_504() {
        let err = ServiceError::DeadlineExceeded {
            operation: "create_car",
            timeout: Duration::from_secs(5),
        };
        assert_eq!(status_of(err), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn ambiguous_commit_keeps_its_own_variant() {
        let err = ApiError::from(DbError::CommitFailed(sqlx_pool_closed()));
        assert!(matches!(err, ApiError::Ambiguous(_)));
    }

    #[tokio::test]
    async fn write_deadline_is_reported_as_unknown_outcome() {
        let err = ApiError::from(ServiceError::WriteOutcomeUnknown {
            operation: "create_car",
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(err, ApiError::Ambiguous(_)));

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "commit_outcome_unknown");
    }

    fn sqlx_pool_closed() -> sqlx::Error {
        sqlx::Error::PoolClosed
    }
}
