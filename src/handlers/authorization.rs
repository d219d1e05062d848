use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use super::crud::{json_body, path_id};
use crate::{
    error::{ErrorResponse, ServiceResult},
    models::{FormPermissionsDto, MenuRolDto, RolFormPermissionDto, RolPermissionsDto},
    service::AuthorizationService,
};

/// assign_rol_permissions
///
/// [Authorization Route] Grants the listed permissions, per form, to the rol.
/// All rows are stored in one transaction.
#[utoipa::path(
    post,
    path = "/api/Rol/{id}/permissions",
    params(("id" = i32, Path, description = "Rol ID")),
    request_body = [FormPermissionsDto],
    responses(
        (status = 201, description = "Permissions assigned", body = [RolFormPermissionDto]),
        (status = 400, description = "Invalid assignment", body = ErrorResponse),
        (status = 404, description = "Rol not found", body = ErrorResponse)
    )
)]
pub async fn assign_rol_permissions(
    State(service): State<AuthorizationService>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<Vec<FormPermissionsDto>>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
    let rol_id = path_id(path)?;
    let assignments = json_body(body)?;
    let created = service.assign_permissions(rol_id, assignments).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// get_rol_permissions
///
/// [Authorization Route] The rol's active permissions grouped by form.
#[utoipa::path(
    get,
    path = "/api/Rol/{id}/permissions",
    params(("id" = i32, Path, description = "Rol ID")),
    responses(
        (status = 200, description = "Permissions by form", body = [FormPermissionsDto]),
        (status = 404, description = "Rol not found", body = ErrorResponse)
    )
)]
pub async fn get_rol_permissions(
    State(service): State<AuthorizationService>,
    path: Result<Path<i32>, PathRejection>,
) -> ServiceResult<Json<Vec<FormPermissionsDto>>> {
    let rol_id = path_id(path)?;
    service.form_permissions_by_rol(rol_id).await.map(Json)
}

/// get_user_permissions
///
/// [Authorization Route] Everything the user may do, grouped rol -> form -> permission.
#[utoipa::path(
    get,
    path = "/api/User/{id}/permissions",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Permissions by rol", body = [RolPermissionsDto]),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user_permissions(
    State(service): State<AuthorizationService>,
    path: Result<Path<i32>, PathRejection>,
) -> ServiceResult<Json<Vec<RolPermissionsDto>>> {
    let user_id = path_id(path)?;
    service.permissions_by_user(user_id).await.map(Json)
}

/// get_user_menu
///
/// [Authorization Route] The navigation menu of the user, grouped rol -> module -> forms.
#[utoipa::path(
    get,
    path = "/api/User/{id}/menu",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Menu by rol", body = [MenuRolDto]),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user_menu(
    State(service): State<AuthorizationService>,
    path: Result<Path<i32>, PathRejection>,
) -> ServiceResult<Json<Vec<MenuRolDto>>> {
    let user_id = path_id(path)?;
    service.menu_by_user(user_id).await.map(Json)
}
