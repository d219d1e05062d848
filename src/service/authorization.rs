use std::collections::{BTreeMap, BTreeSet};

use validator::Validate;

use super::crud::ensure_id;
use crate::{
    error::{ServiceError, ServiceResult},
    models::{
        Dto, Entity, FormPermissionGroupDto, FormPermissionsDto, MenuModuleDto, MenuRolDto,
        PermissionRefDto, Rol, RolFormPermission, RolFormPermissionDto, RolPermissionsDto, User,
        UserMenuRow, UserPermissionRow,
    },
    repository::{AuthorizationRepositoryState, RepositoryState},
};

/// AuthorizationService
///
/// Aggregates the rol/form/permission/module join tables into the nested projections
/// the admin frontend consumes, and assigns permissions to a rol in one batch.
#[derive(Clone)]
pub struct AuthorizationService {
    repo: AuthorizationRepositoryState,
    rols: RepositoryState<Rol>,
    users: RepositoryState<User>,
}

impl AuthorizationService {
    pub fn new(
        repo: AuthorizationRepositoryState,
        rols: RepositoryState<Rol>,
        users: RepositoryState<User>,
    ) -> Self {
        Self { repo, rols, users }
    }

    async fn ensure_rol(&self, rol_id: i32) -> ServiceResult<()> {
        ensure_id("rol_id", rol_id)?;
        match self.rols.get_by_id(rol_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found(Rol::NAME, rol_id)),
        }
    }

    async fn ensure_user(&self, user_id: i32) -> ServiceResult<()> {
        ensure_id("user_id", user_id)?;
        match self.users.get_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found(User::NAME, user_id)),
        }
    }

    /// assign_permissions
    ///
    /// Grants every listed permission on every listed form to the rol. Duplicate
    /// (form, permission) pairs in the request collapse into one row. The rows are
    /// stored all together or not at all.
    pub async fn assign_permissions(
        &self,
        rol_id: i32,
        assignments: Vec<FormPermissionsDto>,
    ) -> ServiceResult<Vec<RolFormPermissionDto>> {
        ensure_id("rol_id", rol_id)?;
        if assignments.is_empty() {
            return Err(ServiceError::validation(
                "permissions",
                "must contain at least one form",
            ));
        }

        let mut requested: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
        for assignment in &assignments {
            assignment.validate()?;
            for &permission_id in &assignment.permission_ids {
                ensure_id("permission_ids", permission_id)?;
            }
            requested
                .entry(assignment.form_id)
                .or_default()
                .extend(assignment.permission_ids.iter().copied());
        }

        self.ensure_rol(rol_id).await?;

        let rows: Vec<RolFormPermission> = requested
            .into_iter()
            .flat_map(|(form_id, permission_ids)| {
                permission_ids
                    .into_iter()
                    .map(move |permission_id| RolFormPermission {
                        rol_id,
                        form_id,
                        permission_id,
                        ..RolFormPermission::default()
                    })
            })
            .collect();

        let created = self.repo.assign_form_permissions(rows).await?;
        tracing::info!(rol_id, count = created.len(), "assigned form permissions");

        Ok(created
            .into_iter()
            .map(RolFormPermissionDto::from_entity)
            .collect())
    }

    /// The rol's active grants, one entry per form.
    pub async fn form_permissions_by_rol(
        &self,
        rol_id: i32,
    ) -> ServiceResult<Vec<FormPermissionsDto>> {
        self.ensure_rol(rol_id).await?;
        let rows = self.repo.rol_form_permissions(rol_id).await?;
        Ok(group_form_permissions(rows))
    }

    pub async fn permissions_by_user(&self, user_id: i32) -> ServiceResult<Vec<RolPermissionsDto>> {
        self.ensure_user(user_id).await?;
        let rows = self.repo.user_permission_rows(user_id).await?;
        tracing::debug!(user_id, rows = rows.len(), "loaded permission rows");
        Ok(group_permissions(rows))
    }

    pub async fn menu_by_user(&self, user_id: i32) -> ServiceResult<Vec<MenuRolDto>> {
        self.ensure_user(user_id).await?;
        let rows = self.repo.user_menu_rows(user_id).await?;
        tracing::debug!(user_id, rows = rows.len(), "loaded menu rows");
        Ok(group_menu(rows))
    }
}

// --- Grouping (pure) ---

/// Groups grant rows by form. Forms and permission ids come out sorted and distinct.
pub fn group_form_permissions(rows: Vec<RolFormPermission>) -> Vec<FormPermissionsDto> {
    let mut forms: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
    for row in rows {
        forms.entry(row.form_id).or_default().insert(row.permission_id);
    }

    forms
        .into_iter()
        .map(|(form_id, permission_ids)| FormPermissionsDto {
            form_id,
            permission_ids: permission_ids.into_iter().collect(),
        })
        .collect()
}

type FormBucket = (String, BTreeMap<i32, String>);

/// group_permissions
///
/// rol -> form -> permission. Every level is ordered by id and a permission reached
/// twice through the same rol and form appears once.
pub fn group_permissions(rows: Vec<UserPermissionRow>) -> Vec<RolPermissionsDto> {
    let mut rols: BTreeMap<i32, (String, BTreeMap<i32, FormBucket>)> = BTreeMap::new();

    for row in rows {
        let (_, forms) = rols
            .entry(row.rol_id)
            .or_insert_with(|| (row.rol_name, BTreeMap::new()));
        let (_, permissions) = forms
            .entry(row.form_id)
            .or_insert_with(|| (row.form_name, BTreeMap::new()));
        permissions
            .entry(row.permission_id)
            .or_insert(row.permission_name);
    }

    rols.into_iter()
        .map(|(rol_id, (rol_name, forms))| RolPermissionsDto {
            rol_id,
            rol_name,
            forms: forms
                .into_iter()
                .map(|(form_id, (form_name, permissions))| FormPermissionGroupDto {
                    form_id,
                    form_name,
                    permissions: permissions
                        .into_iter()
                        .map(|(id, name)| PermissionRefDto { id, name })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// group_menu
///
/// rol -> module -> form names. Form names are listed in form id order, each once.
pub fn group_menu(rows: Vec<UserMenuRow>) -> Vec<MenuRolDto> {
    let mut rols: BTreeMap<i32, (String, BTreeMap<i32, FormBucket>)> = BTreeMap::new();

    for row in rows {
        let (_, modules) = rols
            .entry(row.rol_id)
            .or_insert_with(|| (row.rol_name, BTreeMap::new()));
        let (_, forms) = modules
            .entry(row.module_id)
            .or_insert_with(|| (row.module_name, BTreeMap::new()));
        forms.entry(row.form_id).or_insert(row.form_name);
    }

    rols.into_iter()
        .map(|(rol_id, (rol_name, modules))| MenuRolDto {
            rol_id,
            rol_name,
            modules: modules
                .into_iter()
                .map(|(module_id, (module_name, forms))| {
                    let mut names: Vec<String> = Vec::with_capacity(forms.len());
                    for name in forms.into_values() {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                    MenuModuleDto {
                        module_id,
                        module_name,
                        forms: names,
                    }
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission_row(form_id: i32, form: &str, permission_id: i32, permission: &str) -> UserPermissionRow {
        UserPermissionRow {
            rol_id: 1,
            rol_name: "Admin".to_string(),
            form_id,
            form_name: form.to_string(),
            permission_id,
            permission_name: permission.to_string(),
        }
    }

    #[test]
    fn group_permissions_merges_rols_and_dedups_permissions() {
        let rows = vec![
            permission_row(2, "Reports", 1, "read"),
            permission_row(1, "Users", 1, "read"),
            permission_row(1, "Users", 2, "write"),
            permission_row(1, "Users", 1, "read"),
            permission_row(2, "Reports", 1, "read"),
        ];

        let grouped = group_permissions(rows);

        assert_eq!(grouped.len(), 1);
        let rol = &grouped[0];
        assert_eq!(rol.rol_name, "Admin");
        assert_eq!(rol.forms.len(), 2);

        assert_eq!(rol.forms[0].form_id, 1);
        assert_eq!(rol.forms[0].form_name, "Users");
        let names: Vec<_> = rol.forms[0].permissions.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["read", "write"]);

        assert_eq!(rol.forms[1].form_id, 2);
        assert_eq!(rol.forms[1].permissions.len(), 1);
    }

    #[test]
    fn group_permissions_of_nothing_is_empty() {
        assert!(group_permissions(Vec::new()).is_empty());
    }

    #[test]
    fn group_menu_lists_distinct_form_names_per_module() {
        let row = |rol_id: i32, module_id: i32, module: &str, form_id: i32, form: &str| UserMenuRow {
            rol_id,
            rol_name: format!("rol-{}", rol_id),
            module_id,
            module_name: module.to_string(),
            form_id,
            form_name: form.to_string(),
        };
        let rows = vec![
            row(1, 10, "Security", 2, "Roles"),
            row(1, 10, "Security", 1, "Users"),
            row(1, 10, "Security", 1, "Users"),
            row(1, 11, "Training", 3, "Programs"),
            row(2, 10, "Security", 1, "Users"),
        ];

        let menu = group_menu(rows);

        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0].modules.len(), 2);
        assert_eq!(menu[0].modules[0].module_name, "Security");
        assert_eq!(menu[0].modules[0].forms, vec!["Users", "Roles"]);
        assert_eq!(menu[0].modules[1].forms, vec!["Programs"]);
        assert_eq!(menu[1].rol_name, "rol-2");
        assert_eq!(menu[1].modules[0].forms, vec!["Users"]);
    }

    #[test]
    fn group_form_permissions_sorts_and_dedups() {
        let grant = |form_id: i32, permission_id: i32| RolFormPermission {
            rol_id: 1,
            form_id,
            permission_id,
            ..RolFormPermission::default()
        };

        let grouped = group_form_permissions(vec![grant(3, 2), grant(1, 5), grant(3, 1), grant(3, 2)]);

        assert_eq!(
            grouped,
            vec![
                FormPermissionsDto {
                    form_id: 1,
                    permission_ids: vec![5],
                },
                FormPermissionsDto {
                    form_id: 3,
                    permission_ids: vec![1, 2],
                },
            ]
        );
    }
}
