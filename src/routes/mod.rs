//! Router Module Index
//!
//! The REST surface is split by concern: the generic entity resources under
//! `/api/<Entity>`, the rol/permission projections and operational endpoints.

use axum::{
    Router,
    routing::{MethodRouter, get},
};

use crate::{
    AppState,
    handlers::crud,
    models::{Dto, Entity, PatchDto},
    service::CrudService,
};

/// `/api/<Entity>` and `/api/<Entity>/{id}` for every entity.
pub mod entities;

/// Rol permission assignment and the per-user permission and menu projections.
pub mod authorization;

/// Health check, no state.
pub mod public;

/// GET list, POST create, DELETE status toggle.
fn collection<D: Dto>() -> MethodRouter<CrudService<D>> {
    get(crud::list::<D>)
        .post(crud::create::<D>)
        .delete(crud::set_active::<D>)
}

/// GET by id, PUT replace, DELETE hard delete.
fn item<D: Dto>() -> MethodRouter<CrudService<D>> {
    get(crud::get_one::<D>)
        .put(crud::update::<D>)
        .delete(crud::delete::<D>)
}

fn resource<D: Dto>(service: CrudService<D>, item: MethodRouter<CrudService<D>>) -> Router<AppState> {
    let base = format!("/api/{}", <D::Entity as Entity>::NAME);
    let by_id = format!("{}/{{id}}", base);

    Router::new()
        .route(&base, collection::<D>())
        .route(&by_id, item)
        .with_state(service)
}

/// entity_routes
///
/// Mounts the standard resource routes of one entity, bound to its service.
pub fn entity_routes<D: Dto>(service: CrudService<D>) -> Router<AppState> {
    resource(service, item::<D>())
}

/// patchable_entity_routes
///
/// `entity_routes` plus `PATCH /api/<Entity>/{id}` with the patch DTO `P`.
pub fn patchable_entity_routes<D, P>(service: CrudService<D>) -> Router<AppState>
where
    D: Dto,
    P: PatchDto<Target = D>,
{
    resource(service, item::<D>().patch(crud::patch::<D, P>))
}
