pub mod authorization;
pub mod crud;

/// health
///
/// [Public Route] Liveness check for load balancers and container orchestration.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
