use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Operational endpoints that carry no domain data.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Used by monitoring and load balancer checks. Returns "ok" immediately.
        .route("/health", get(handlers::health))
}
