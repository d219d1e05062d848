use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::{Audit, Dto, PatchDto, assign, not_blank, nullable};
use crate::error::{ServiceError, ServiceResult};

// --- Identity ---

/// Person
///
/// Identity data of an individual. A `User` optionally points at one person.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Person {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub email: String,
    pub phone: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Person, "Person", "person", [
    first_name,
    last_name,
    document_type,
    document_number,
    email,
    phone,
]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct PersonDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub last_name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 20, message = "must be at most 20 characters")
    )]
    pub document_type: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 30, message = "must be at most 30 characters")
    )]
    pub document_number: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "must be at most 30 characters"))]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(PersonDto => Person, [
    first_name,
    last_name,
    document_type,
    document_number,
    email,
    phone,
]);

/// PersonPatch
///
/// Contact details are the only person fields that change after registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct PersonPatch {
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 30, message = "must be at most 30 characters")
    )]
    pub phone: Option<Option<String>>,
}

impl PatchDto for PersonPatch {
    type Target = PersonDto;

    fn apply(self, person: &mut Person) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(&mut person.email, self.email, "email", &mut changed);
        assign(&mut person.phone, self.phone, "phone", &mut changed);
        changed
    }
}

/// User
///
/// Login identity. `password` holds an argon2 PHC string once persisted.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
    pub person_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(User, "User", "app_user", [username, email, password, person_id]);

/// UserDto
///
/// The password is accepted on input but never serialized back to clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct UserDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub username: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub email: String,
    #[serde(default, skip_serializing)]
    #[validate(length(max = 128, message = "must be at most 128 characters"))]
    pub password: String,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub person_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Dto for UserDto {
    type Entity = User;

    fn into_entity(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password: self.password,
            person_id: self.person_id,
            audit: self.audit,
        }
    }

    fn from_entity(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            password: user.password,
            person_id: user.person_id,
            audit: user.audit,
        }
    }

    /// Every password received from a client is treated as plain text and hashed.
    /// A blank password on replace keeps the stored hash.
    fn before_save(user: &mut User, existing: Option<&User>) -> ServiceResult<()> {
        if user.password.trim().is_empty() {
            return match existing {
                Some(stored) => {
                    user.password = stored.password.clone();
                    Ok(())
                }
                None => Err(ServiceError::validation("password", "must not be empty")),
            };
        }
        user.password = hash_password(&user.password)?;
        Ok(())
    }
}

fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::ExternalService {
            subsystem: "password hashing",
            message: e.to_string(),
            source: None,
        })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct UserPatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub username: Option<String>,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub email: Option<String>,
}

impl PatchDto for UserPatch {
    type Target = UserDto;

    fn apply(self, user: &mut User) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(&mut user.username, self.username, "username", &mut changed);
        assign(&mut user.email, self.email, "email", &mut changed);
        changed
    }
}

// --- Roles, forms, modules, permissions ---

/// Rol
///
/// A named permission group assigned to users through `UserRol`.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Rol {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Rol, "Rol", "rol", [name, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct RolDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(RolDto => Rol, [name, description]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct RolPatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl PatchDto for RolPatch {
    type Target = RolDto;

    fn apply(self, rol: &mut Rol) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(&mut rol.name, self.name, "name", &mut changed);
        assign(&mut rol.description, self.description, "description", &mut changed);
        changed
    }
}

/// Form
///
/// A navigable screen of the admin frontend.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Form {
    pub id: i32,
    pub name: String,
    pub path: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Form, "Form", "form", [name, path, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct FormDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(FormDto => Form, [name, path, description]);

/// Module
///
/// A menu section grouping forms.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Module {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Module, "Module", "module", [name, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct ModuleDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(ModuleDto => Module, [name, description]);

/// FormModule
///
/// Join row placing a form inside a module.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct FormModule {
    pub id: i32,
    pub form_id: i32,
    pub module_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(FormModule, "FormModule", "form_module", [form_id, module_id]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct FormModuleDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub form_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub module_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(FormModuleDto => FormModule, [form_id, module_id]);

/// Permission
///
/// An action grant such as `read` or `update`.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Permission {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Permission, "Permission", "permission", [name, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct PermissionDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(PermissionDto => Permission, [name, description]);

/// RolFormPermission
///
/// Grants `permission_id` on `form_id` to every user holding `rol_id`.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct RolFormPermission {
    pub id: i32,
    pub rol_id: i32,
    pub form_id: i32,
    pub permission_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(RolFormPermission, "RolFormPermission", "rol_form_permission", [
    rol_id,
    form_id,
    permission_id,
]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct RolFormPermissionDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub rol_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub form_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub permission_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(RolFormPermissionDto => RolFormPermission, [rol_id, form_id, permission_id]);

/// UserRol
///
/// Join row assigning a rol to a user.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct UserRol {
    pub id: i32,
    pub user_id: i32,
    pub rol_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(UserRol, "UserRol", "user_rol", [user_id, rol_id]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct UserRolDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub user_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub rol_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(UserRolDto => UserRol, [user_id, rol_id]);

/// UserSede
///
/// Join row scoping a user to a sede (the tenant boundary of the admin backend).
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct UserSede {
    pub id: i32,
    pub user_id: i32,
    pub sede_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(UserSede, "UserSede", "user_sede", [user_id, sede_id]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct UserSedeDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub user_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub sede_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(UserSedeDto => UserSede, [user_id, sede_id]);
