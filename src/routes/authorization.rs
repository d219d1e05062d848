use crate::{AppState, handlers::authorization};
use axum::{Router, routing::get};

/// Authorization Router Module
///
/// Read models and batch assignment of the rol/form/permission tables. These handlers
/// pull `AuthorizationService` out of `AppState` through `FromRef`.
pub fn authorization_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /api/Rol/{id}/permissions
        // POST stores a batch of (form, permission) grants in one transaction.
        .route(
            "/api/Rol/{id}/permissions",
            get(authorization::get_rol_permissions).post(authorization::assign_rol_permissions),
        )
        // GET /api/User/{id}/permissions
        .route(
            "/api/User/{id}/permissions",
            get(authorization::get_user_permissions),
        )
        // GET /api/User/{id}/menu
        // Modules and forms reachable through the user's roles.
        .route("/api/User/{id}/menu", get(authorization::get_user_menu))
}
