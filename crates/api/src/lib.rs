//! `api` crate: HTTP surface over the car and engine services.
//!
//! Routes:
//!   POST   /login
//!   GET    /cars?brand=<b>&isEngine=<bool>     (bearer)
//!   POST   /cars                               (bearer)
//!   GET    /cars/{id}                          (bearer)
//!   PUT    /cars/{id}                          (bearer)
//!   DELETE /cars/{id}                          (bearer)
//!   POST   /engine                             (bearer)
//!   GET    /engine/{id}                        (bearer)
//!   PUT    /engine/{id}                        (bearer)
//!   DELETE /engine/{id}                        (bearer)
//!   GET    /metrics
//!   GET    /health

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;

use std::future::Future;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use service::{CarService, EngineService};

pub use auth::{AuthConfig, Claims};
pub use error::ApiError;
pub use metrics::Metrics;

/// Shared handler state.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub cars: CarService,
    pub engines: EngineService,
    pub auth: Arc<AuthConfig>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(cars: CarService, engines: EngineService, auth: AuthConfig) -> Self {
        Self {
            cars,
            engines,
            auth: Arc::new(auth),
            metrics: Arc::new(Metrics::new()),
        }
    }
}

/// Build the full router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(handlers::cars::router())
        .merge(handlers::engines::router())
        .route_layer(from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        .merge(protected)
        .merge(handlers::login::router())
        .merge(handlers::health::router())
        .route("/metrics", get(metrics::export))
        .layer(from_fn_with_state(state.metrics.clone(), metrics::track))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Server listening on {addr}");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
