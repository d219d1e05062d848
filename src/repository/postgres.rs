use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::{marker::PhantomData, sync::Arc};

use super::{
    AuthorizationRepository, AuthorizationRepositoryState, Repository, RepositoryFactory,
    RepositoryState,
};
use crate::{
    error::{DataError, DataResult},
    models::{Entity, RolFormPermission, UserMenuRow, UserPermissionRow, Value},
};

/// Logs a failed statement and converts it into a `DataError`.
fn failed(operation: &str, table: &str, err: sqlx::Error) -> DataError {
    match DataError::from_statement(table, err) {
        DataError::Database(err) => {
            tracing::error!(table, "{} error: {:?}", operation, err);
            DataError::Database(err)
        }
        rejected => {
            tracing::warn!(table, "{} rejected: {}", operation, rejected);
            rejected
        }
    }
}

/// Binds a column value. `None` variants bind as SQL `NULL`.
fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: Value) {
    match value {
        Value::Text(text) => builder.push_bind(text),
        Value::Int(number) => builder.push_bind(number),
        Value::Bool(flag) => builder.push_bind(flag),
    };
}

/// PostgresRepository
///
/// Generic implementation of `Repository<E>` backed by PostgreSQL. Statements are built
/// at runtime with `QueryBuilder`: table and column names come from the `Entity`
/// implementation, every value is a bound parameter.
pub struct PostgresRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PostgresRepository<E> {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PostgresRepository<E> {
    async fn get_all(&self) -> DataResult<Vec<E>> {
        let sql = format!("SELECT * FROM {} WHERE active = true ORDER BY id", E::TABLE);
        sqlx::query_as::<_, E>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| failed("get_all", E::TABLE, e))
    }

    async fn get_by_id(&self, id: i32) -> DataResult<Option<E>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", E::TABLE);
        sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| failed("get_by_id", E::TABLE, e))
    }

    /// create
    ///
    /// `INSERT ... RETURNING *` so the caller receives the generated id and the
    /// stamped `create_date` in one round trip.
    async fn create(&self, entity: E) -> DataResult<E> {
        let columns = entity.columns();
        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} (", E::TABLE));
        builder.push(names.join(", "));
        builder.push(", active, create_date) VALUES (");
        for (_, value) in columns {
            push_value(&mut builder, value);
            builder.push(", ");
        }
        builder.push_bind(entity.audit().active);
        builder.push(", ");
        builder.push_bind(Utc::now());
        builder.push(") RETURNING *");

        builder
            .build_query_as::<E>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| failed("create", E::TABLE, e))
    }

    /// update
    ///
    /// Full replace of the domain columns and `active`. `delete_date` follows the
    /// resulting flag: cleared when active, kept (or stamped) when inactive.
    async fn update(&self, entity: E) -> DataResult<bool> {
        let now = Utc::now();
        let active = entity.audit().active;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
        for (name, value) in entity.columns() {
            builder.push(name);
            builder.push(" = ");
            push_value(&mut builder, value);
            builder.push(", ");
        }
        builder.push("active = ");
        builder.push_bind(active);
        builder.push(", delete_date = CASE WHEN ");
        builder.push_bind(active);
        builder.push(" THEN NULL ELSE COALESCE(delete_date, ");
        builder.push_bind(now);
        builder.push(") END, update_date = ");
        builder.push_bind(now);
        builder.push(" WHERE id = ");
        builder.push_bind(entity.id());

        match builder.build().execute(&self.pool).await {
            Ok(res) => Ok(res.rows_affected() > 0),
            Err(e) => Err(failed("update", E::TABLE, e)),
        }
    }

    async fn delete(&self, id: i32) -> DataResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        match sqlx::query(&sql).bind(id).execute(&self.pool).await {
            Ok(res) => Ok(res.rows_affected() > 0),
            Err(e) => Err(failed("delete", E::TABLE, e)),
        }
    }

    async fn set_active(&self, id: i32, active: bool) -> DataResult<bool> {
        let now = Utc::now();
        let delete_date = if active { None } else { Some(now) };
        let sql = format!(
            "UPDATE {} SET active = $1, delete_date = $2, update_date = $3 WHERE id = $4",
            E::TABLE
        );

        match sqlx::query(&sql)
            .bind(active)
            .bind(delete_date)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => Ok(res.rows_affected() > 0),
            Err(e) => Err(failed("set_active", E::TABLE, e)),
        }
    }

    /// patch
    ///
    /// Same statement shape as `update`, restricted to the requested columns.
    async fn patch(&self, entity: E, columns: &[&'static str]) -> DataResult<bool> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
        for (name, value) in entity
            .columns()
            .into_iter()
            .filter(|(name, _)| columns.contains(name))
        {
            builder.push(name);
            builder.push(" = ");
            push_value(&mut builder, value);
            builder.push(", ");
        }
        builder.push("update_date = ");
        builder.push_bind(Utc::now());
        builder.push(" WHERE id = ");
        builder.push_bind(entity.id());

        match builder.build().execute(&self.pool).await {
            Ok(res) => Ok(res.rows_affected() > 0),
            Err(e) => Err(failed("patch", E::TABLE, e)),
        }
    }
}

/// PostgresAuthorizationRepository
///
/// The join queries of the rol/permission model.
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    /// assign_form_permissions
    ///
    /// Runs every insert inside one transaction: either the whole assignment is stored
    /// or, on the first failure, the transaction is dropped and rolled back.
    async fn assign_form_permissions(
        &self,
        rows: Vec<RolFormPermission>,
    ) -> DataResult<Vec<RolFormPermission>> {
        let table = "rol_form_permission";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| failed("assign begin", table, e))?;

        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let inserted = sqlx::query_as::<_, RolFormPermission>(
                r#"
                INSERT INTO rol_form_permission (rol_id, form_id, permission_id, active, create_date)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(row.rol_id)
            .bind(row.form_id)
            .bind(row.permission_id)
            .bind(row.audit.active)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| failed("assign insert", table, e))?;
            created.push(inserted);
        }

        tx.commit()
            .await
            .map_err(|e| failed("assign commit", table, e))?;
        Ok(created)
    }

    async fn rol_form_permissions(&self, rol_id: i32) -> DataResult<Vec<RolFormPermission>> {
        sqlx::query_as::<_, RolFormPermission>(
            r#"
            SELECT * FROM rol_form_permission
            WHERE rol_id = $1 AND active = true
            ORDER BY form_id, permission_id
            "#,
        )
        .bind(rol_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| failed("rol_form_permissions", "rol_form_permission", e))
    }

    async fn user_permission_rows(&self, user_id: i32) -> DataResult<Vec<UserPermissionRow>> {
        let query = r#"
            SELECT
                r.id AS rol_id,
                r.name AS rol_name,
                f.id AS form_id,
                f.name AS form_name,
                p.id AS permission_id,
                p.name AS permission_name
            FROM user_rol ur
            JOIN rol r ON r.id = ur.rol_id
            JOIN rol_form_permission rfp ON rfp.rol_id = r.id
            JOIN form f ON f.id = rfp.form_id
            JOIN permission p ON p.id = rfp.permission_id
            WHERE ur.user_id = $1
              AND ur.active AND r.active AND rfp.active AND f.active AND p.active
            ORDER BY r.id, f.id, p.id
        "#;

        sqlx::query_as::<_, UserPermissionRow>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| failed("user_permission_rows", "user_rol", e))
    }

    async fn user_menu_rows(&self, user_id: i32) -> DataResult<Vec<UserMenuRow>> {
        let query = r#"
            SELECT DISTINCT
                r.id AS rol_id,
                r.name AS rol_name,
                m.id AS module_id,
                m.name AS module_name,
                f.id AS form_id,
                f.name AS form_name
            FROM user_rol ur
            JOIN rol r ON r.id = ur.rol_id
            JOIN rol_form_permission rfp ON rfp.rol_id = r.id
            JOIN form f ON f.id = rfp.form_id
            JOIN form_module fm ON fm.form_id = f.id
            JOIN module m ON m.id = fm.module_id
            WHERE ur.user_id = $1
              AND ur.active AND r.active AND rfp.active AND f.active
              AND fm.active AND m.active
            ORDER BY r.id, m.id, f.id
        "#;

        sqlx::query_as::<_, UserMenuRow>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| failed("user_menu_rows", "user_rol", e))
    }
}

/// PostgresStore
///
/// Repository factory over one shared connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RepositoryFactory for PostgresStore {
    fn repository<E: Entity>(&self) -> RepositoryState<E> {
        Arc::new(PostgresRepository::<E>::new(self.pool.clone()))
    }

    fn authorization(&self) -> AuthorizationRepositoryState {
        Arc::new(PostgresAuthorizationRepository::new(self.pool.clone()))
    }
}
