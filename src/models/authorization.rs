use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

// --- Join rows (Internal) ---

/// UserPermissionRow
///
/// One row of the UserRol -> Rol -> RolFormPermission -> Form -> Permission join.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserPermissionRow {
    pub rol_id: i32,
    pub rol_name: String,
    pub form_id: i32,
    pub form_name: String,
    pub permission_id: i32,
    pub permission_name: String,
}

/// UserMenuRow
///
/// One row of the UserRol -> Rol -> RolFormPermission -> Form -> FormModule -> Module join.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserMenuRow {
    pub rol_id: i32,
    pub rol_name: String,
    pub module_id: i32,
    pub module_name: String,
    pub form_id: i32,
    pub form_name: String,
}

// --- Request/Response payloads ---

/// FormPermissionsDto
///
/// The permissions a rol holds on one form. Used both as the input of
/// `POST /api/Rol/{id}/permissions` and as the output of its GET counterpart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct FormPermissionsDto {
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub form_id: i32,
    #[validate(length(min = 1, message = "must contain at least one permission"))]
    pub permission_ids: Vec<i32>,
}

/// PermissionRefDto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PermissionRefDto {
    pub id: i32,
    pub name: String,
}

/// FormPermissionGroupDto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FormPermissionGroupDto {
    pub form_id: i32,
    pub form_name: String,
    pub permissions: Vec<PermissionRefDto>,
}

/// RolPermissionsDto
///
/// Response of `GET /api/User/{id}/permissions`: rol -> forms -> distinct permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RolPermissionsDto {
    pub rol_id: i32,
    pub rol_name: String,
    pub forms: Vec<FormPermissionGroupDto>,
}

/// MenuModuleDto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MenuModuleDto {
    pub module_id: i32,
    pub module_name: String,
    /// Distinct form names reachable from this module.
    pub forms: Vec<String>,
}

/// MenuRolDto
///
/// Response of `GET /api/User/{id}/menu`: rol -> modules -> form names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MenuRolDto {
    pub rol_id: i32,
    pub rol_name: String,
    pub modules: Vec<MenuModuleDto>,
}
