use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use sqlx::{FromRow, postgres::PgRow};
use std::borrow::Cow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::ServiceResult;

// --- Declarative helpers shared by every entity module ---

/// Implements `Entity` for a row struct that has an `id: i32` and an `audit: Audit` field.
/// The listed columns are the domain columns written on insert/update, in table order.
macro_rules! entity {
    ($entity:ident, $name:literal, $table:literal, [$($column:ident),+ $(,)?]) => {
        impl $crate::models::Entity for $entity {
            const NAME: &'static str = $name;
            const TABLE: &'static str = $table;

            fn id(&self) -> i32 {
                self.id
            }

            fn set_id(&mut self, id: i32) {
                self.id = id;
            }

            fn audit(&self) -> &$crate::models::Audit {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::models::Audit {
                &mut self.audit
            }

            fn columns(&self) -> Vec<$crate::models::Column> {
                vec![$((stringify!($column), $crate::models::Value::from(self.$column.clone()))),+]
            }
        }
    };
}

/// Implements `Dto` as a field-by-field copy between a DTO and its entity.
macro_rules! dto {
    ($dto:ident => $entity:ident, [$($field:ident),+ $(,)?]) => {
        impl $crate::models::Dto for $dto {
            type Entity = $entity;

            fn into_entity(self) -> $entity {
                $entity {
                    id: self.id,
                    $($field: self.$field,)+
                    audit: self.audit,
                }
            }

            fn from_entity(entity: $entity) -> Self {
                Self {
                    id: entity.id,
                    $($field: entity.$field,)+
                    audit: entity.audit,
                }
            }
        }
    };
}

pub mod authorization;
pub mod catalog;
pub mod organization;
pub mod security;
pub mod training;

pub use authorization::*;
pub use catalog::*;
pub use organization::*;
pub use security::*;
pub use training::*;

// --- Shared row/DTO building blocks ---

/// Audit
///
/// The soft-delete and timestamp block every table carries. It is flattened into both
/// the database row (`#[sqlx(flatten)]`) and the JSON payload (`#[serde(flatten)]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, TS, ToSchema)]
#[ts(export)]
pub struct Audit {
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delete_date: Option<DateTime<Utc>>,
}

impl Default for Audit {
    fn default() -> Self {
        Self {
            active: true,
            create_date: None,
            update_date: None,
            delete_date: None,
        }
    }
}

fn default_active() -> bool {
    true
}

/// Value
///
/// A column value handed to the SQL builder. Optional variants bind as `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(Option<String>),
    Int(Option<i32>),
    Bool(bool),
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Some(value))
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        Value::Text(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(Some(value))
    }
}

impl From<Option<i32>> for Value {
    fn from(value: Option<i32>) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// A named column and the value to write into it.
pub type Column = (&'static str, Value);

/// Entity
///
/// The persisted shape of one table. The generic repositories rely only on this trait,
/// so a new table needs nothing beyond a row struct and an `entity!` invocation.
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + std::fmt::Debug + Clone + Send + Sync + Unpin + 'static
{
    /// Display name used in routes and error messages (e.g. `Center`).
    const NAME: &'static str;
    /// SQL table name.
    const TABLE: &'static str;

    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);
    fn audit(&self) -> &Audit;
    fn audit_mut(&mut self) -> &mut Audit;

    /// Domain columns (everything except `id` and the audit block).
    fn columns(&self) -> Vec<Column>;
}

/// Dto
///
/// The API shape of an entity. Validation rules live on the DTO through `validator`
/// attributes; mapping is a plain field copy in both directions.
pub trait Dto: Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static {
    type Entity: Entity;

    fn into_entity(self) -> Self::Entity;
    fn from_entity(entity: Self::Entity) -> Self;

    /// Runs on the mapped entity right before it is created (`existing` is `None`)
    /// or replaced (`existing` is the stored row).
    fn before_save(
        _entity: &mut Self::Entity,
        _existing: Option<&Self::Entity>,
    ) -> ServiceResult<()> {
        Ok(())
    }
}

/// PatchDto
///
/// A partial update touching a fixed subset of columns. `apply` copies the provided
/// fields onto the entity and returns the names of the columns it changed.
pub trait PatchDto: DeserializeOwned + Validate + Send + 'static {
    type Target: Dto;

    fn apply(self, entity: &mut <Self::Target as Dto>::Entity) -> Vec<&'static str>;
}

/// Writes `value` into `slot` when present and records the column name.
pub(crate) fn assign<T>(
    slot: &mut T,
    value: Option<T>,
    column: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(value) = value {
        *slot = value;
        changed.push(column);
    }
}

/// Deserializes a nullable patch field: an absent key stays `None` (through
/// `#[serde(default)]`), an explicit `null` becomes `Some(None)` and clears the column.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// SetActiveDto
///
/// Body of the status toggle endpoint (`DELETE /api/<Entity>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct SetActiveDto {
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub id: i32,
    pub active: bool,
}

// --- Validation helpers ---

/// Rejects empty and whitespace-only strings.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::from("must not be empty")));
    }
    Ok(())
}
