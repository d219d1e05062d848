use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::{Audit, PatchDto, assign, not_blank, nullable};

// Reference data of the training workflow. Most of these are referenced by
// `AprendizProcessInstructor`.

/// Program
///
/// A training program offered by the institution.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Program {
    pub id: i32,
    pub code_program: String,
    pub name: String,
    pub type_program: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Program, "Program", "program", [code_program, name, type_program, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct ProgramDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 30, message = "must be at most 30 characters")
    )]
    pub code_program: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "must be at most 50 characters")
    )]
    pub type_program: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(ProgramDto => Program, [code_program, name, type_program, description]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct ProgramPatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl PatchDto for ProgramPatch {
    type Target = ProgramDto;

    fn apply(self, program: &mut Program) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(&mut program.name, self.name, "name", &mut changed);
        assign(
            &mut program.description,
            self.description,
            "description",
            &mut changed,
        );
        changed
    }
}

/// Process
///
/// The productive-stage process a learner goes through (contract, internship, ...).
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Process {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Process, "Process", "process", [name, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct ProcessDto {
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

dto!(ProcessDto => Process, [name, description]);

/// Concept
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Concept {
    pub id: i32,
    pub name: String,
    pub observation: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Concept, "Concept", "concept", [name, observation]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct ConceptDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(ConceptDto => Concept, [name, observation]);

/// Enterprise
///
/// A company hosting learners during their productive stage.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Enterprise {
    pub id: i32,
    pub name: String,
    pub nit: String,
    pub locate: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Enterprise, "Enterprise", "enterprise", [name, nit, locate, phone, email]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct EnterpriseDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 30, message = "must be at most 30 characters")
    )]
    pub nit: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub locate: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "must be at most 30 characters"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub email: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(EnterpriseDto => Enterprise, [name, nit, locate, phone, email]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct EnterprisePatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub locate: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "must be at most 30 characters"))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub email: Option<Option<String>>,
}

impl PatchDto for EnterprisePatch {
    type Target = EnterpriseDto;

    fn apply(self, enterprise: &mut Enterprise) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(&mut enterprise.locate, self.locate, "locate", &mut changed);
        assign(&mut enterprise.phone, self.phone, "phone", &mut changed);
        assign(&mut enterprise.email, self.email, "email", &mut changed);
        changed
    }
}

/// Verification
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Verification {
    pub id: i32,
    pub name: String,
    pub observation: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Verification, "Verification", "verification", [name, observation]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct VerificationDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(VerificationDto => Verification, [name, observation]);

/// TypeModality
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct TypeModality {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(TypeModality, "TypeModality", "type_modality", [name, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct TypeModalityDto {
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

dto!(TypeModalityDto => TypeModality, [name, description]);

/// RegisterySofia
///
/// A registration record from the SOFIA Plus academic system.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct RegisterySofia {
    pub id: i32,
    pub name: String,
    pub document: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(RegisterySofia, "RegisterySofia", "registery_sofia", [name, document, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct RegisterySofiaDto {
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
    pub document: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(RegisterySofiaDto => RegisterySofia, [name, document, description]);

/// State
///
/// Workflow state of a learner/instructor assignment.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct State {
    pub id: i32,
    pub type_state: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(State, "State", "state", [type_state, description]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct StateDto {
    #[serde(default)]
    pub id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub type_state: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(StateDto => State, [type_state, description]);
