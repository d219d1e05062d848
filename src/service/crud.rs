use std::marker::PhantomData;

use validator::Validate;

use crate::{
    error::{ServiceError, ServiceResult},
    models::{Dto, Entity, PatchDto, SetActiveDto},
    repository::RepositoryState,
};

/// Rejects non-positive ids before any storage access.
pub(crate) fn ensure_id(field: &'static str, id: i32) -> ServiceResult<()> {
    if id <= 0 {
        return Err(ServiceError::validation(field, "must be greater than zero"));
    }
    Ok(())
}

/// CrudService
///
/// The business layer shared by every entity. It owns validation, existence checks and
/// the DTO <-> entity mapping; the repository underneath only stores rows.
///
/// Every operation that receives an id checks it first, so a bad id never reaches the
/// data layer.
pub struct CrudService<D: Dto> {
    repo: RepositoryState<D::Entity>,
    _dto: PhantomData<fn() -> D>,
}

impl<D: Dto> Clone for CrudService<D> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            _dto: PhantomData,
        }
    }
}

impl<D: Dto> CrudService<D> {
    pub fn new(repo: RepositoryState<D::Entity>) -> Self {
        Self {
            repo,
            _dto: PhantomData,
        }
    }

    fn name() -> &'static str {
        <D::Entity as Entity>::NAME
    }

    async fn find(&self, id: i32) -> ServiceResult<D::Entity> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Self::name(), id))
    }

    /// Active records, ordered by id.
    pub async fn get_all(&self) -> ServiceResult<Vec<D>> {
        let rows = self.repo.get_all().await?;
        tracing::debug!(entity = Self::name(), count = rows.len(), "listed records");
        Ok(rows.into_iter().map(D::from_entity).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> ServiceResult<D> {
        ensure_id("id", id)?;
        self.find(id).await.map(D::from_entity)
    }

    /// create
    ///
    /// The client-supplied id is ignored; storage assigns it.
    pub async fn create(&self, dto: D) -> ServiceResult<D> {
        dto.validate()?;

        let mut entity = dto.into_entity();
        entity.set_id(0);
        D::before_save(&mut entity, None)?;

        let created = self.repo.create(entity).await?;
        tracing::info!(entity = Self::name(), id = created.id(), "created record");
        Ok(D::from_entity(created))
    }

    /// update
    ///
    /// Full replace of the record at `id`. The id in the path wins over any id in the body.
    pub async fn update(&self, id: i32, dto: D) -> ServiceResult<D> {
        ensure_id("id", id)?;
        dto.validate()?;
        let existing = self.find(id).await?;

        let mut entity = dto.into_entity();
        entity.set_id(id);
        D::before_save(&mut entity, Some(&existing))?;

        if !self.repo.update(entity).await? {
            return Err(ServiceError::not_found(Self::name(), id));
        }
        tracing::info!(entity = Self::name(), id, "updated record");

        self.find(id).await.map(D::from_entity)
    }

    /// Permanently removes the record.
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        ensure_id("id", id)?;
        self.find(id).await?;

        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found(Self::name(), id));
        }
        tracing::info!(entity = Self::name(), id, "deleted record");
        Ok(())
    }

    /// set_active
    ///
    /// Soft delete (`active = false`) or restore (`active = true`).
    pub async fn set_active(&self, request: SetActiveDto) -> ServiceResult<SetActiveDto> {
        ensure_id("id", request.id)?;
        request.validate()?;
        self.find(request.id).await?;

        if !self.repo.set_active(request.id, request.active).await? {
            return Err(ServiceError::not_found(Self::name(), request.id));
        }
        tracing::info!(
            entity = Self::name(),
            id = request.id,
            active = request.active,
            "changed record status"
        );
        Ok(request)
    }

    /// patch
    ///
    /// Applies a partial update and persists only the columns it touched.
    pub async fn patch<P>(&self, id: i32, patch: P) -> ServiceResult<D>
    where
        P: PatchDto<Target = D>,
    {
        ensure_id("id", id)?;
        patch.validate()?;
        let mut entity = self.find(id).await?;

        let changed = patch.apply(&mut entity);
        if changed.is_empty() {
            return Err(ServiceError::validation("body", "no fields to update"));
        }

        if !self.repo.patch(entity, &changed).await? {
            return Err(ServiceError::not_found(Self::name(), id));
        }
        tracing::info!(entity = Self::name(), id, columns = ?changed, "patched record");

        self.find(id).await.map(D::from_entity)
    }
}
