use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// DataError
///
/// Failures raised by the data access layer. "No row matched" is never an error at
/// this level: repositories report it through `Option`/`bool` return values so the
/// business layer can tell a missing record apart from a broken database.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The statement was rejected by a schema rule on client supplied data
    /// (unique key, foreign key, column width).
    #[error("{column} {message}")]
    Constraint {
        column: String,
        message: &'static str,
    },
}

pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Classifies a failed statement on `table`. Constraint violations become
    /// `Constraint`, everything else stays a database failure.
    pub fn from_statement(table: &str, err: sqlx::Error) -> Self {
        let Some(db) = err.as_database_error() else {
            return Self::Database(err);
        };

        let message = if db.is_unique_violation() {
            "already exists"
        } else if db.is_foreign_key_violation() {
            "references a record that does not exist"
        } else if db.code().as_deref() == Some(STRING_TOO_LONG) {
            "is too long"
        } else {
            return Self::Database(err);
        };

        let table = db.table().unwrap_or(table);
        let column = db
            .constraint()
            .map(|constraint| constraint_column(table, constraint))
            .unwrap_or_else(|| "body".to_string());

        Self::Constraint { column, message }
    }
}

/// SQLSTATE `string_data_right_truncation`.
const STRING_TOO_LONG: &str = "22001";

/// Recovers the column from a default Postgres constraint name
/// (`<table>_<column>_key`, `<table>_<column>_fkey`).
fn constraint_column(table: &str, constraint: &str) -> String {
    let column = constraint
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(constraint);

    column
        .strip_suffix("_fkey")
        .or_else(|| column.strip_suffix("_key"))
        .unwrap_or(column)
        .to_string()
}

/// ServiceError
///
/// The error taxonomy of the business layer. Each variant maps to exactly one HTTP
/// status code (400, 404 and 500 respectively).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client supplied data failed a precondition.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A referenced record does not exist.
    #[error("{entity} with id {id} was not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Any failure outside the caller's control (database, hashing, ...).
    #[error("{subsystem} failure: {message}")]
    ExternalService {
        subsystem: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn external(
        subsystem: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ExternalService {
            subsystem,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// The HTTP status code this error kind is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ExternalService { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DataError> for ServiceError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Constraint { column, message } => Self::validation(column, message),
            err => Self::external("database", err),
        }
    }
}

/// Collapses validator output into a single `Validation` error.
///
/// Field names are sorted so the reported field is stable across runs.
impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .unwrap_or_else(|| "is invalid".to_string());
                Self::validation(field.to_string(), message)
            }
            None => Self::validation("body", errors.to_string()),
        }
    }
}

/// ErrorResponse
///
/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable kind: `validation`, `not_found` or `external_service`.
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ServiceError::Validation { field, message } => ErrorResponse {
                error: "validation".to_string(),
                message,
                field: Some(field),
            },
            ServiceError::NotFound { entity, id } => ErrorResponse {
                error: "not_found".to_string(),
                message: format!("{} with id {} was not found", entity, id),
                field: None,
            },
            ServiceError::ExternalService {
                subsystem,
                message,
                ..
            } => {
                // The cause stays in the logs, the client only learns which subsystem failed.
                tracing::error!(subsystem, "request failed: {}", message);
                ErrorResponse {
                    error: "external_service".to_string(),
                    message: format!("{} is unavailable", subsystem),
                    field: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
