use axum::Router;

use super::{entity_routes, patchable_entity_routes};
use crate::{
    AppState,
    models::{
        AprendizPatch, CenterPatch, EnterprisePatch, InstructorPatch, PersonPatch, ProgramPatch,
        RolPatch, SedePatch, UserPatch,
    },
    service::Services,
};

/// Entity Router Module
///
/// Every entity gets the same seven routes (see `routes::entity_routes`). Entities with a
/// patch DTO also accept `PATCH /api/<Entity>/{id}`.
pub fn api_routes(services: &Services) -> Router<AppState> {
    Router::new()
        // --- Security ---
        .merge(patchable_entity_routes::<_, PersonPatch>(services.person.clone()))
        .merge(patchable_entity_routes::<_, UserPatch>(services.user.clone()))
        .merge(patchable_entity_routes::<_, RolPatch>(services.rol.clone()))
        .merge(entity_routes(services.form.clone()))
        .merge(entity_routes(services.module.clone()))
        .merge(entity_routes(services.form_module.clone()))
        .merge(entity_routes(services.permission.clone()))
        .merge(entity_routes(services.rol_form_permission.clone()))
        .merge(entity_routes(services.user_rol.clone()))
        .merge(entity_routes(services.user_sede.clone()))
        // --- Organization ---
        .merge(entity_routes(services.regional.clone()))
        .merge(patchable_entity_routes::<_, CenterPatch>(services.center.clone()))
        .merge(patchable_entity_routes::<_, SedePatch>(services.sede.clone()))
        // --- Catalog ---
        .merge(patchable_entity_routes::<_, ProgramPatch>(services.program.clone()))
        .merge(entity_routes(services.process.clone()))
        .merge(entity_routes(services.concept.clone()))
        .merge(patchable_entity_routes::<_, EnterprisePatch>(services.enterprise.clone()))
        .merge(entity_routes(services.verification.clone()))
        .merge(entity_routes(services.type_modality.clone()))
        .merge(entity_routes(services.registery_sofia.clone()))
        .merge(entity_routes(services.state.clone()))
        // --- Training ---
        .merge(patchable_entity_routes::<_, AprendizPatch>(services.aprendiz.clone()))
        .merge(patchable_entity_routes::<_, InstructorPatch>(services.instructor.clone()))
        .merge(entity_routes(services.aprendiz_program.clone()))
        .merge(entity_routes(services.instructor_program.clone()))
        .merge(entity_routes(services.aprendiz_process_instructor.clone()))
}
