use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::{ServiceError, ServiceResult},
    models::{Dto, PatchDto, SetActiveDto},
    service::CrudService,
};

// Generic handlers mounted once per entity by `routes::entity_routes`. The entity is
// picked through the `CrudService<D>` router state, so every handler here is shared by
// all `/api/<Entity>` routes.

/// Turns a rejected `{id}` segment into a validation error on `id`.
pub(crate) fn path_id(path: Result<Path<i32>, PathRejection>) -> ServiceResult<i32> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ServiceError::validation("id", rejection.body_text()))
}

/// Turns a missing or malformed JSON body into a validation error on `body`.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ServiceResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServiceError::validation("body", rejection.body_text()))
}

/// list
///
/// [GET /api/<Entity>] All active records.
pub async fn list<D: Dto>(State(service): State<CrudService<D>>) -> ServiceResult<Json<Vec<D>>> {
    service.get_all().await.map(Json)
}

/// get_one
///
/// [GET /api/<Entity>/{id}] Any record by id, including deactivated ones.
pub async fn get_one<D: Dto>(
    State(service): State<CrudService<D>>,
    path: Result<Path<i32>, PathRejection>,
) -> ServiceResult<Json<D>> {
    let id = path_id(path)?;
    service.get_by_id(id).await.map(Json)
}

/// create
///
/// [POST /api/<Entity>] Responds 201 with the stored record.
pub async fn create<D: Dto>(
    State(service): State<CrudService<D>>,
    body: Result<Json<D>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
    let dto = json_body(body)?;
    let created = service.create(dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// update
///
/// [PUT /api/<Entity>/{id}] Full replace.
pub async fn update<D: Dto>(
    State(service): State<CrudService<D>>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<D>, JsonRejection>,
) -> ServiceResult<Json<D>> {
    let id = path_id(path)?;
    let dto = json_body(body)?;
    service.update(id, dto).await.map(Json)
}

/// patch
///
/// [PATCH /api/<Entity>/{id}] Partial update through the entity's patch DTO.
pub async fn patch<D, P>(
    State(service): State<CrudService<D>>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<P>, JsonRejection>,
) -> ServiceResult<Json<D>>
where
    D: Dto,
    P: PatchDto<Target = D>,
{
    let id = path_id(path)?;
    let changes = json_body(body)?;
    service.patch(id, changes).await.map(Json)
}

/// delete
///
/// [DELETE /api/<Entity>/{id}] Permanent removal, 204 on success.
pub async fn delete<D: Dto>(
    State(service): State<CrudService<D>>,
    path: Result<Path<i32>, PathRejection>,
) -> ServiceResult<StatusCode> {
    let id = path_id(path)?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// set_active
///
/// [DELETE /api/<Entity>] Soft delete or restore, driven by `{ "id", "active" }`.
pub async fn set_active<D: Dto>(
    State(service): State<CrudService<D>>,
    body: Result<Json<SetActiveDto>, JsonRejection>,
) -> ServiceResult<Json<SetActiveDto>> {
    let request = json_body(body)?;
    service.set_active(request).await.map(Json)
}
