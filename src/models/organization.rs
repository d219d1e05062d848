use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::{Audit, PatchDto, assign, not_blank, nullable};

// Location hierarchy: Regional 1-* Center 1-* Sede.

/// Regional
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Regional {
    pub id: i32,
    pub name: String,
    pub code_regional: String,
    pub address: Option<String>,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Regional, "Regional", "regional", [name, code_regional, address, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct RegionalDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 30, message = "must be at most 30 characters")
    )]
    pub code_regional: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(RegionalDto => Regional, [name, code_regional, address, description]);

/// Center
///
/// A training center. The regional link is optional so centers can be registered
/// before the regional catalog is loaded.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Center {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub code_center: Option<String>,
    pub regional_id: Option<i32>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Center, "Center", "center", [name, address, code_center, regional_id]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct CenterDto {
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
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "must be at most 30 characters"))]
    pub code_center: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub regional_id: Option<i32>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(CenterDto => Center, [name, address, code_center, regional_id]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct CenterPatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub address: Option<String>,
}

impl PatchDto for CenterPatch {
    type Target = CenterDto;

    fn apply(self, center: &mut Center) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(&mut center.name, self.name, "name", &mut changed);
        assign(&mut center.address, self.address, "address", &mut changed);
        changed
    }
}

/// Sede
///
/// A campus of a center.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Sede {
    pub id: i32,
    pub name: String,
    pub code_sede: String,
    pub address: String,
    pub phone: Option<String>,
    pub email_contact: Option<String>,
    pub center_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Sede, "Sede", "sede", [name, code_sede, address, phone, email_contact, center_id]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct SedeDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 30, message = "must be at most 30 characters")
    )]
    pub code_sede: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "must be at most 30 characters"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub email_contact: Option<String>,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub center_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(SedeDto => Sede, [name, code_sede, address, phone, email_contact, center_id]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct SedePatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "must be at most 30 characters"))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub email_contact: Option<Option<String>>,
}

impl PatchDto for SedePatch {
    type Target = SedeDto;

    fn apply(self, sede: &mut Sede) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(&mut sede.name, self.name, "name", &mut changed);
        assign(&mut sede.address, self.address, "address", &mut changed);
        assign(&mut sede.phone, self.phone, "phone", &mut changed);
        assign(
            &mut sede.email_contact,
            self.email_contact,
            "email_contact",
            &mut changed,
        );
        changed
    }
}
