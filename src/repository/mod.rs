use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::DataResult,
    models::{Entity, RolFormPermission, UserMenuRow, UserPermissionRow},
};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryAuthorizationRepository, InMemoryRepository, InMemoryStore};
pub use postgres::{PostgresAuthorizationRepository, PostgresRepository, PostgresStore};

/// Repository Trait
///
/// The one persistence contract shared by every entity. Implementations never turn a
/// failure into a boolean: `Err` always means the storage itself failed, while a
/// missing row is reported through `None`/`false`.
///
/// **Send + Sync + async_trait** are required so `Arc<dyn Repository<E>>` can be shared
/// across Axum's task boundaries.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// All active rows, ordered by id.
    async fn get_all(&self) -> DataResult<Vec<E>>;

    /// Any row with the given id, active or not.
    async fn get_by_id(&self, id: i32) -> DataResult<Option<E>>;

    /// Inserts the row, stamping `create_date`, and returns it with its generated id.
    async fn create(&self, entity: E) -> DataResult<E>;

    /// Replaces the domain columns and the active flag, keeping `delete_date` consistent
    /// with the new flag. `false` when no row matched.
    async fn update(&self, entity: E) -> DataResult<bool>;

    /// Hard delete. `false` when no row matched.
    async fn delete(&self, id: i32) -> DataResult<bool>;

    /// Flips the active flag; deactivation stamps `delete_date`, reactivation clears it.
    async fn set_active(&self, id: i32, active: bool) -> DataResult<bool>;

    /// Writes only the named domain columns of `entity`. `false` when no row matched.
    async fn patch(&self, entity: E, columns: &[&'static str]) -> DataResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share one entity's persistence layer.
pub type RepositoryState<E> = Arc<dyn Repository<E>>;

/// AuthorizationRepository
///
/// Join queries behind the rol/permission projections and the batched permission
/// assignment. Only active rows take part in the joins.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Inserts every row or none of them.
    async fn assign_form_permissions(
        &self,
        rows: Vec<RolFormPermission>,
    ) -> DataResult<Vec<RolFormPermission>>;

    async fn rol_form_permissions(&self, rol_id: i32) -> DataResult<Vec<RolFormPermission>>;

    async fn user_permission_rows(&self, user_id: i32) -> DataResult<Vec<UserPermissionRow>>;

    async fn user_menu_rows(&self, user_id: i32) -> DataResult<Vec<UserMenuRow>>;
}

pub type AuthorizationRepositoryState = Arc<dyn AuthorizationRepository>;

/// RepositoryFactory
///
/// Hands out repositories backed by one storage (a Postgres pool or the in-memory store).
/// `Services` is assembled from a factory so both backends wire up identically.
pub trait RepositoryFactory {
    fn repository<E: Entity>(&self) -> RepositoryState<E>;

    fn authorization(&self) -> AuthorizationRepositoryState;
}
