use async_trait::async_trait;
use chrono::Utc;
use std::{
    any::{Any, TypeId},
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};
use tokio::sync::RwLock;

use super::{
    AuthorizationRepository, AuthorizationRepositoryState, Repository, RepositoryFactory,
    RepositoryState,
};
use crate::{
    error::DataResult,
    models::{
        Entity, Form, FormModule, Module, Permission, Rol, RolFormPermission, UserMenuRow,
        UserPermissionRow, UserRol,
    },
};

struct Table<E> {
    rows: BTreeMap<i32, E>,
    next_id: i32,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

type SharedTable<E> = Arc<RwLock<Table<E>>>;

/// InMemoryRepository
///
/// `Repository<E>` over a `BTreeMap` guarded by a tokio `RwLock`. Ids are assigned
/// sequentially from 1 and the audit columns are stamped exactly like the Postgres
/// statements do, so services behave the same on both backends. Used by the test
/// suites and by local runs without a database.
pub struct InMemoryRepository<E> {
    table: SharedTable<E>,
}

impl<E> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
        }
    }

    fn from_table(table: SharedTable<E>) -> Self {
        Self { table }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    /// Every stored row, inactive ones included, ordered by id.
    pub async fn rows(&self) -> Vec<E> {
        self.table.read().await.rows.values().cloned().collect()
    }

    async fn active_rows(&self) -> Vec<E> {
        self.table
            .read()
            .await
            .rows
            .values()
            .filter(|row| row.audit().active)
            .cloned()
            .collect()
    }

    async fn active_row(&self, id: i32) -> Option<E> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .filter(|row| row.audit().active)
            .cloned()
    }
}

fn insert<E: Entity>(table: &mut Table<E>, mut entity: E) -> E {
    let id = table.next_id;
    table.next_id += 1;

    entity.set_id(id);
    let audit = entity.audit_mut();
    audit.create_date = Some(Utc::now());
    audit.update_date = None;
    audit.delete_date = None;

    table.rows.insert(id, entity.clone());
    entity
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn get_all(&self) -> DataResult<Vec<E>> {
        Ok(self.active_rows().await)
    }

    async fn get_by_id(&self, id: i32) -> DataResult<Option<E>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, entity: E) -> DataResult<E> {
        let mut table = self.table.write().await;
        Ok(insert(&mut table, entity))
    }

    async fn update(&self, mut entity: E) -> DataResult<bool> {
        let mut table = self.table.write().await;
        let Some(stored) = table.rows.get_mut(&entity.id()) else {
            return Ok(false);
        };

        let now = Utc::now();
        let active = entity.audit().active;
        let audit = entity.audit_mut();
        *audit = stored.audit().clone();
        audit.active = active;
        audit.delete_date = if active {
            None
        } else {
            audit.delete_date.or(Some(now))
        };
        audit.update_date = Some(now);

        *stored = entity;
        Ok(true)
    }

    async fn delete(&self, id: i32) -> DataResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn set_active(&self, id: i32, active: bool) -> DataResult<bool> {
        let mut table = self.table.write().await;
        let Some(stored) = table.rows.get_mut(&id) else {
            return Ok(false);
        };

        let now = Utc::now();
        let audit = stored.audit_mut();
        audit.active = active;
        audit.delete_date = if active { None } else { Some(now) };
        audit.update_date = Some(now);
        Ok(true)
    }

    /// The stored row is replaced by `entity`, which the caller derived from the stored
    /// row. Only the audit block is taken from storage.
    async fn patch(&self, mut entity: E, _columns: &[&'static str]) -> DataResult<bool> {
        let mut table = self.table.write().await;
        let Some(stored) = table.rows.get_mut(&entity.id()) else {
            return Ok(false);
        };

        let audit = entity.audit_mut();
        *audit = stored.audit().clone();
        audit.update_date = Some(Utc::now());

        *stored = entity;
        Ok(true)
    }
}

/// InMemoryAuthorizationRepository
///
/// Evaluates the rol/permission joins over the in-memory tables. It must be built from
/// the same `InMemoryStore` as the entity repositories to see their rows.
pub struct InMemoryAuthorizationRepository {
    user_rols: InMemoryRepository<UserRol>,
    rols: InMemoryRepository<Rol>,
    grants: InMemoryRepository<RolFormPermission>,
    forms: InMemoryRepository<Form>,
    permissions: InMemoryRepository<Permission>,
    form_modules: InMemoryRepository<FormModule>,
    modules: InMemoryRepository<Module>,
}

impl InMemoryAuthorizationRepository {
    pub fn new(store: &InMemoryStore) -> Self {
        Self {
            user_rols: store.typed(),
            rols: store.typed(),
            grants: store.typed(),
            forms: store.typed(),
            permissions: store.typed(),
            form_modules: store.typed(),
            modules: store.typed(),
        }
    }

    /// Active (rol, grant) pairs reachable from the user's active rol assignments.
    async fn user_grants(&self, user_id: i32) -> Vec<(Rol, RolFormPermission)> {
        let grants = self.grants.active_rows().await;
        let mut pairs = Vec::new();

        for user_rol in self.user_rols.active_rows().await {
            if user_rol.user_id != user_id {
                continue;
            }
            let Some(rol) = self.rols.active_row(user_rol.rol_id).await else {
                continue;
            };
            for grant in grants.iter().filter(|g| g.rol_id == rol.id) {
                pairs.push((rol.clone(), grant.clone()));
            }
        }
        pairs
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAuthorizationRepository {
    async fn assign_form_permissions(
        &self,
        rows: Vec<RolFormPermission>,
    ) -> DataResult<Vec<RolFormPermission>> {
        // One write guard for the whole batch keeps the assignment atomic.
        let mut table = self.grants.table.write().await;
        Ok(rows.into_iter().map(|row| insert(&mut table, row)).collect())
    }

    async fn rol_form_permissions(&self, rol_id: i32) -> DataResult<Vec<RolFormPermission>> {
        let mut rows: Vec<_> = self
            .grants
            .active_rows()
            .await
            .into_iter()
            .filter(|row| row.rol_id == rol_id)
            .collect();
        rows.sort_by_key(|row| (row.form_id, row.permission_id));
        Ok(rows)
    }

    async fn user_permission_rows(&self, user_id: i32) -> DataResult<Vec<UserPermissionRow>> {
        let mut rows = Vec::new();

        for (rol, grant) in self.user_grants(user_id).await {
            let Some(form) = self.forms.active_row(grant.form_id).await else {
                continue;
            };
            let Some(permission) = self.permissions.active_row(grant.permission_id).await else {
                continue;
            };
            rows.push(UserPermissionRow {
                rol_id: rol.id,
                rol_name: rol.name.clone(),
                form_id: form.id,
                form_name: form.name,
                permission_id: permission.id,
                permission_name: permission.name,
            });
        }

        rows.sort_by_key(|row| (row.rol_id, row.form_id, row.permission_id));
        Ok(rows)
    }

    async fn user_menu_rows(&self, user_id: i32) -> DataResult<Vec<UserMenuRow>> {
        let form_modules = self.form_modules.active_rows().await;
        let mut rows = Vec::new();

        for (rol, grant) in self.user_grants(user_id).await {
            let Some(form) = self.forms.active_row(grant.form_id).await else {
                continue;
            };
            for link in form_modules.iter().filter(|fm| fm.form_id == form.id) {
                let Some(module) = self.modules.active_row(link.module_id).await else {
                    continue;
                };
                rows.push(UserMenuRow {
                    rol_id: rol.id,
                    rol_name: rol.name.clone(),
                    module_id: module.id,
                    module_name: module.name,
                    form_id: form.id,
                    form_name: form.name.clone(),
                });
            }
        }

        rows.sort_by_key(|row| (row.rol_id, row.module_id, row.form_id));
        rows.dedup();
        Ok(rows)
    }
}

/// InMemoryStore
///
/// One table per entity type, created on first use and shared by every repository the
/// store hands out.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table<E: Entity>(&self) -> SharedTable<E> {
        let mut tables = self
            .tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        tables
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(SharedTable::<E>::default()) as Box<dyn Any + Send + Sync>)
            .downcast_ref::<SharedTable<E>>()
            .cloned()
            .expect("in-memory tables are keyed by their row type")
    }

    /// The concrete repository of one table, for seeding and inspection.
    pub fn typed<E: Entity>(&self) -> InMemoryRepository<E> {
        InMemoryRepository::from_table(self.table::<E>())
    }
}

impl RepositoryFactory for InMemoryStore {
    fn repository<E: Entity>(&self) -> RepositoryState<E> {
        Arc::new(self.typed::<E>())
    }

    fn authorization(&self) -> AuthorizationRepositoryState {
        Arc::new(InMemoryAuthorizationRepository::new(self))
    }
}
