use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::{Audit, PatchDto, assign, not_blank, nullable};

/// Aprendiz
///
/// A learner. Every aprendiz is backed by a `User`.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Aprendiz {
    pub id: i32,
    pub user_id: i32,
    pub previous_program: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Aprendiz, "Aprendiz", "aprendiz", [user_id, previous_program]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct AprendizDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub user_id: i32,
    #[serde(default)]
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub previous_program: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(AprendizDto => Aprendiz, [user_id, previous_program]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct AprendizPatch {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub previous_program: Option<Option<String>>,
}

impl PatchDto for AprendizPatch {
    type Target = AprendizDto;

    fn apply(self, aprendiz: &mut Aprendiz) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(
            &mut aprendiz.previous_program,
            self.previous_program,
            "previous_program",
            &mut changed,
        );
        changed
    }
}

/// Instructor
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Instructor {
    pub id: i32,
    pub user_id: i32,
    pub knowledge_area: String,
    pub contract_type: String,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(Instructor, "Instructor", "instructor", [user_id, knowledge_area, contract_type]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct InstructorDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub user_id: i32,
    #[validate(
        custom(function = "not_blank"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub knowledge_area: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "must be at most 50 characters")
    )]
    pub contract_type: String,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(InstructorDto => Instructor, [user_id, knowledge_area, contract_type]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct InstructorPatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 150, message = "must be at most 150 characters")
    )]
    pub knowledge_area: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "must be at most 50 characters")
    )]
    pub contract_type: Option<String>,
}

impl PatchDto for InstructorPatch {
    type Target = InstructorDto;

    fn apply(self, instructor: &mut Instructor) -> Vec<&'static str> {
        let mut changed = Vec::new();
        assign(
            &mut instructor.knowledge_area,
            self.knowledge_area,
            "knowledge_area",
            &mut changed,
        );
        assign(
            &mut instructor.contract_type,
            self.contract_type,
            "contract_type",
            &mut changed,
        );
        changed
    }
}

/// AprendizProgram
///
/// Enrollment of a learner in a program.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct AprendizProgram {
    pub id: i32,
    pub aprendiz_id: i32,
    pub program_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(AprendizProgram, "AprendizProgram", "aprendiz_program", [aprendiz_id, program_id]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct AprendizProgramDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub aprendiz_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub program_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(AprendizProgramDto => AprendizProgram, [aprendiz_id, program_id]);

/// InstructorProgram
///
/// Assignment of an instructor to a program.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct InstructorProgram {
    pub id: i32,
    pub instructor_id: i32,
    pub program_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(InstructorProgram, "InstructorProgram", "instructor_program", [
    instructor_id,
    program_id,
]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct InstructorProgramDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub instructor_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub program_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(InstructorProgramDto => InstructorProgram, [instructor_id, program_id]);

/// AprendizProcessInstructor
///
/// The central fact row of the productive stage: which instructor follows which
/// learner, in which process and enterprise, under which modality, state and
/// verification. Only positivity of the foreign keys is enforced.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct AprendizProcessInstructor {
    pub id: i32,
    pub aprendiz_id: i32,
    pub instructor_id: i32,
    pub process_id: i32,
    pub enterprise_id: i32,
    pub type_modality_id: i32,
    pub state_id: i32,
    pub verification_id: i32,
    pub registery_sofia_id: i32,
    pub concept_id: i32,
    #[sqlx(flatten)]
    pub audit: Audit,
}

entity!(AprendizProcessInstructor, "AprendizProcessInstructor", "aprendiz_process_instructor", [
    aprendiz_id,
    instructor_id,
    process_id,
    enterprise_id,
    type_modality_id,
    state_id,
    verification_id,
    registery_sofia_id,
    concept_id,
]);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct AprendizProcessInstructorDto {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub aprendiz_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub instructor_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub process_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub enterprise_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub type_modality_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub state_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub verification_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub registery_sofia_id: i32,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub concept_id: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

dto!(AprendizProcessInstructorDto => AprendizProcessInstructor, [
    aprendiz_id,
    instructor_id,
    process_id,
    enterprise_id,
    type_modality_id,
    state_id,
    verification_id,
    registery_sofia_id,
    concept_id,
]);
