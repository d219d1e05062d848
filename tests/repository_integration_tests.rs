use chrono::Utc;
use serial_test::serial;
use sqlx::PgPool;
use tokio::test;
use training_admin::{
    error::DataError,
    models::{
        Center, Entity, Form, FormModule, Module, Permission, Person, Rol, RolFormPermission, Sede,
        User, UserRol,
    },
    repository::{
        AuthorizationRepository, PostgresAuthorizationRepository, PostgresRepository, Repository,
    },
};

// --- Test Context and Setup ---

/// Holds the pool of the database the integration tests run against.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    /// Connects and migrates, or returns `None` when no `DATABASE_URL` is configured.
    async fn setup() -> Option<Self> {
        dotenv::dotenv().ok();

        let Ok(db_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres repository tests");
            return None;
        };

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        Some(DbTestContext { pool })
    }

    fn repository<E: Entity>(&self) -> PostgresRepository<E> {
        PostgresRepository::new(self.pool.clone())
    }

    fn authorization(&self) -> PostgresAuthorizationRepository {
        PostgresAuthorizationRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// A suffix that keeps rows of repeated runs apart.
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn create_person(ctx: &DbTestContext) -> Person {
    ctx.repository::<Person>()
        .create(Person {
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            document_type: "CC".to_string(),
            document_number: unique("doc").chars().take(30).collect(),
            email: "ana@example.com".to_string(),
            ..Person::default()
        })
        .await
        .unwrap()
}

async fn create_user(ctx: &DbTestContext, username: &str) -> User {
    let person = create_person(ctx).await;
    ctx.repository::<User>()
        .create(User {
            username: username.to_string(),
            email: "ana@example.com".to_string(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            person_id: person.id,
            ..User::default()
        })
        .await
        .unwrap()
}

fn north_center() -> Center {
    Center {
        name: unique("North"),
        address: "123 St".to_string(),
        ..Center::default()
    }
}

// --- Entity Repository ---

#[test]
#[serial]
async fn test_center_lifecycle_against_postgres() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository::<Center>();

    // 1. Create stamps the id and create_date.
    let created = repo.create(north_center()).await.unwrap();
    assert!(created.id > 0);
    assert!(created.audit.active);
    assert!(created.audit.create_date.is_some());
    assert!(created.audit.delete_date.is_none());

    let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    // 2. Update replaces the domain columns and keeps create_date.
    let replacement = Center {
        id: created.id,
        name: "North II".to_string(),
        code_center: Some("C-9".to_string()),
        ..north_center()
    };
    assert!(repo.update(replacement).await.unwrap());
    let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "North II");
    assert_eq!(stored.code_center.as_deref(), Some("C-9"));
    assert_eq!(stored.audit.create_date, created.audit.create_date);
    assert!(stored.audit.update_date.is_some());

    // 3. Deactivation hides the row and stamps delete_date.
    assert!(repo.set_active(created.id, false).await.unwrap());
    let hidden = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert!(!hidden.audit.active);
    assert!(hidden.audit.delete_date.is_some());
    let listed = repo.get_all().await.unwrap();
    assert!(listed.iter().all(|c| c.id != created.id));

    // 4. A replace that keeps it inactive keeps delete_date; reactivating clears it.
    let mut inactive = stored.clone();
    inactive.audit.active = false;
    assert!(repo.update(inactive).await.unwrap());
    let still_hidden = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(still_hidden.audit.delete_date, hidden.audit.delete_date);

    assert!(repo.update(stored.clone()).await.unwrap());
    let restored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert!(restored.audit.active);
    assert!(restored.audit.delete_date.is_none());
    assert!(repo.get_all().await.unwrap().iter().any(|c| c.id == created.id));

    // 5. Patch writes only the listed columns.
    let mut patched = restored.clone();
    patched.address = "456 Av".to_string();
    patched.name = "ignored".to_string();
    assert!(repo.patch(patched, &["address"]).await.unwrap());
    let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.address, "456 Av");
    assert_eq!(stored.name, "North II");

    // 6. Hard delete.
    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    assert!(!repo.delete(created.id).await.unwrap());
    assert!(!repo.set_active(created.id, true).await.unwrap());
}

#[test]
#[serial]
async fn test_schema_rules_surface_as_constraint_errors() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };

    // Duplicate username.
    let username = unique("user");
    let user = create_user(&ctx, &username).await;
    let duplicate = ctx
        .repository::<User>()
        .create(User {
            id: 0,
            ..user.clone()
        })
        .await
        .unwrap_err();
    assert!(
        matches!(duplicate, DataError::Constraint { ref column, .. } if column == "username"),
        "got {:?}",
        duplicate
    );

    // Missing parent row.
    let orphan = ctx
        .repository::<Sede>()
        .create(Sede {
            name: "Sede Norte".to_string(),
            code_sede: "SN".to_string(),
            address: "Calle 10".to_string(),
            center_id: i32::MAX,
            ..Sede::default()
        })
        .await
        .unwrap_err();
    assert!(
        matches!(orphan, DataError::Constraint { ref column, .. } if column == "center_id"),
        "got {:?}",
        orphan
    );

    // Value wider than the column.
    let too_long = ctx
        .repository::<Center>()
        .create(Center {
            code_center: Some("C".repeat(31)),
            ..north_center()
        })
        .await
        .unwrap_err();
    assert!(
        matches!(too_long, DataError::Constraint { message: "is too long", .. }),
        "got {:?}",
        too_long
    );
}

// --- Authorization Repository ---

#[test]
#[serial]
async fn test_permission_and_menu_joins_against_postgres() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let auth = ctx.authorization();

    let user = create_user(&ctx, &unique("menu")).await;
    let rol = ctx
        .repository::<Rol>()
        .create(Rol {
            name: "Instructor".to_string(),
            ..Rol::default()
        })
        .await
        .unwrap();
    let form = ctx
        .repository::<Form>()
        .create(Form {
            name: "Programs".to_string(),
            path: "/programs".to_string(),
            ..Form::default()
        })
        .await
        .unwrap();
    let module = ctx
        .repository::<Module>()
        .create(Module {
            name: "Training".to_string(),
            ..Module::default()
        })
        .await
        .unwrap();
    let permissions = ctx.repository::<Permission>();
    let read = permissions
        .create(Permission {
            name: "read".to_string(),
            ..Permission::default()
        })
        .await
        .unwrap();
    let write = permissions
        .create(Permission {
            name: "write".to_string(),
            ..Permission::default()
        })
        .await
        .unwrap();
    ctx.repository::<FormModule>()
        .create(FormModule {
            form_id: form.id,
            module_id: module.id,
            ..FormModule::default()
        })
        .await
        .unwrap();
    ctx.repository::<UserRol>()
        .create(UserRol {
            user_id: user.id,
            rol_id: rol.id,
            ..UserRol::default()
        })
        .await
        .unwrap();

    let grant = |permission_id| RolFormPermission {
        rol_id: rol.id,
        form_id: form.id,
        permission_id,
        ..RolFormPermission::default()
    };
    let created = auth
        .assign_form_permissions(vec![grant(read.id), grant(write.id)])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|row| row.id > 0 && row.audit.create_date.is_some()));

    let by_rol = auth.rol_form_permissions(rol.id).await.unwrap();
    let ids: Vec<_> = by_rol.iter().map(|row| row.permission_id).collect();
    assert_eq!(ids, vec![read.id, write.id]);

    let rows = auth.user_permission_rows(user.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.rol_name == "Instructor" && row.form_name == "Programs"));

    // Two permissions on one form still produce a single menu entry.
    let menu = auth.user_menu_rows(user.id).await.unwrap();
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0].module_name, "Training");
    assert_eq!(menu[0].form_name, "Programs");

    // Deactivated permissions drop out of the joins.
    permissions.set_active(write.id, false).await.unwrap();
    let rows = auth.user_permission_rows(user.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].permission_name, "read");
}

#[test]
#[serial]
async fn test_failed_assignment_stores_nothing() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let auth = ctx.authorization();

    let rol = ctx
        .repository::<Rol>()
        .create(Rol {
            name: "Auditor".to_string(),
            ..Rol::default()
        })
        .await
        .unwrap();
    let form = ctx
        .repository::<Form>()
        .create(Form {
            name: "Reports".to_string(),
            path: "/reports".to_string(),
            ..Form::default()
        })
        .await
        .unwrap();
    let read = ctx
        .repository::<Permission>()
        .create(Permission {
            name: "read".to_string(),
            ..Permission::default()
        })
        .await
        .unwrap();

    let grant = |permission_id| RolFormPermission {
        rol_id: rol.id,
        form_id: form.id,
        permission_id,
        ..RolFormPermission::default()
    };
    let err = auth
        .assign_form_permissions(vec![grant(read.id), grant(i32::MAX)])
        .await
        .unwrap_err();
    assert!(
        matches!(err, DataError::Constraint { ref column, .. } if column == "permission_id"),
        "got {:?}",
        err
    );

    assert!(auth.rol_form_permissions(rol.id).await.unwrap().is_empty());
}
