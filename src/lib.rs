use axum::{Router, extract::FromRef, http::HeaderName};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Layers, leaves first: models -> repository -> service -> handlers -> routes.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub mod routes;
use routes::{authorization::authorization_routes, entities::api_routes, public::public_routes};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{DataError, ServiceError, ServiceResult};
pub use service::{AuthorizationService, CrudService, Services};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation served at `/api-docs/openapi.json`.
/// The per-entity CRUD routes are generic, so only their schemas are listed here.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::authorization::assign_rol_permissions,
        handlers::authorization::get_rol_permissions,
        handlers::authorization::get_user_permissions,
        handlers::authorization::get_user_menu,
    ),
    components(
        schemas(
            // Shared
            models::Audit, models::SetActiveDto, error::ErrorResponse,
            // Security
            models::PersonDto, models::PersonPatch, models::UserDto, models::UserPatch,
            models::RolDto, models::RolPatch, models::FormDto, models::ModuleDto,
            models::FormModuleDto, models::PermissionDto, models::RolFormPermissionDto,
            models::UserRolDto, models::UserSedeDto,
            // Organization
            models::RegionalDto, models::CenterDto, models::CenterPatch, models::SedeDto,
            models::SedePatch,
            // Catalog
            models::ProgramDto, models::ProgramPatch, models::ProcessDto, models::ConceptDto,
            models::EnterpriseDto, models::EnterprisePatch, models::VerificationDto,
            models::TypeModalityDto, models::RegisterySofiaDto, models::StateDto,
            // Training
            models::AprendizDto, models::AprendizPatch, models::InstructorDto,
            models::InstructorPatch, models::AprendizProgramDto, models::InstructorProgramDto,
            models::AprendizProcessInstructorDto,
            // Authorization projections
            models::FormPermissionsDto, models::PermissionRefDto, models::FormPermissionGroupDto,
            models::RolPermissionsDto, models::MenuModuleDto, models::MenuRolDto,
        )
    ),
    tags(
        (name = "training-admin", description = "Training administration API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single, immutable container shared across all requests. Services are behind an
/// `Arc` so cloning the state per request stays cheap.
#[derive(Clone)]
pub struct AppState {
    /// Business layer: one service per entity plus the authorization aggregator.
    pub services: Arc<Services>,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(services: Services, config: AppConfig) -> Self {
        Self {
            services: Arc::new(services),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AuthorizationService {
    fn from_ref(app_state: &AppState) -> AuthorizationService {
        app_state.services.authorization.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the global middleware and registers the
/// application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes())
        // Entity resources carry their own service as router state.
        .merge(api_routes(&state.services))
        .merge(authorization_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `TraceLayer` span: HTTP method, URI and the `x-request-id` header, so every
/// log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
