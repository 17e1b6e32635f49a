use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{
    AppError, BlockedDelete, CallerContext, DEFAULT_PASSWORD, DeleteReport, Resource, Role, Scope,
    hash_password, resolve_read_scope,
};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::db::conflict_on_unique;
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate, push_search_predicate};

use super::model::{
    Administration, AdministrationListParams, AdministrationListResponse, CreateAdministrationDto,
    UpdateAdministrationDto,
};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: None,
    owner: None,
};

const SELECT: &str = "SELECT id, first_name, last_name, username, email, role, school_id, \
     created_at, updated_at FROM administrations WHERE 1=1";

const RETURNING: &str = "RETURNING id, first_name, last_name, username, email, role, school_id, \
     created_at, updated_at";

/// Rows an admin caller may touch: only fellow admins, never management or
/// super records. Management within a school may touch everything but super.
fn push_role_restriction(qb: &mut QueryBuilder<'_, Postgres>, caller_role: Role) {
    match caller_role {
        Role::Super => {}
        Role::Admin => {
            qb.push(" AND role = 'admin'");
        }
        _ => {
            qb.push(" AND role <> 'super'");
        }
    }
}

pub struct AdministrationService;

impl AdministrationService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: AdministrationListParams,
    ) -> Result<AdministrationListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Administrations);
        if scope.is_empty() {
            return Ok(AdministrationListResponse {
                data: Vec::new(),
                total: 0,
            });
        }

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_scope_predicate(qb, &scope, &COLS);
            push_role_restriction(qb, ctx.role);
            if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
                push_search_predicate(
                    qb,
                    &["first_name", "last_name", "username", "email"],
                    search,
                );
            }
            if let Some(role) = params.role.as_deref().filter(|r| !r.is_empty()) {
                qb.push(" AND role = ");
                qb.push_bind(role.to_string());
            }
            if let Some(school_id) = params.schoolid {
                qb.push(" AND school_id = ");
                qb.push_bind(school_id);
            }
        };

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM administrations WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY last_name, first_name LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query
            .build_query_as::<Administration>()
            .fetch_all(db)
            .await?;

        Ok(AdministrationListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<Administration, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Administrations);
        let mut query = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut query, &scope, &COLS);
        push_role_restriction(&mut query, ctx.role);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<Administration>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Administrator not found")))
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateAdministrationDto,
    ) -> Result<Administration, AppError> {
        let scope = require_write_scope(ctx, Resource::Administrations)?;

        // Admin callers may only create fellow admins.
        if ctx.role == Role::Admin && dto.role != "admin" {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Access denied - admins may only create admin accounts"
            )));
        }

        let school_id = resolve_target_school(&scope, dto.school_id)?;
        let password = hash_password(dto.password.as_deref().unwrap_or(DEFAULT_PASSWORD))?;

        let row = sqlx::query_as::<_, Administration>(&format!(
            "INSERT INTO administrations \
             (first_name, last_name, username, email, password, role, school_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) {RETURNING}"
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password)
        .bind(&dto.role)
        .bind(school_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            conflict_on_unique(e, "Administrator with this username or email already exists")
        })?;

        Ok(row)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateAdministrationDto,
    ) -> Result<Administration, AppError> {
        let scope = require_write_scope(ctx, Resource::Administrations)?;

        if ctx.role == Role::Admin && matches!(dto.role.as_deref(), Some(r) if r != "admin") {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Access denied - admins may only assign the admin role"
            )));
        }

        let mut query = QueryBuilder::new("UPDATE administrations SET updated_at = NOW()");
        if let Some(first_name) = &dto.first_name {
            query.push(", first_name = ");
            query.push_bind(first_name);
        }
        if let Some(last_name) = &dto.last_name {
            query.push(", last_name = ");
            query.push_bind(last_name);
        }
        if let Some(email) = &dto.email {
            query.push(", email = ");
            query.push_bind(email);
        }
        if let Some(password) = &dto.password {
            let hashed = hash_password(password)?;
            query.push(", password = ");
            query.push_bind(hashed);
        }
        if let Some(role) = &dto.role {
            query.push(", role = ");
            query.push_bind(role);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &COLS);
        push_role_restriction(&mut query, ctx.role);
        query.push(" ");
        query.push(RETURNING);

        query
            .build_query_as::<Administration>()
            .fetch_optional(db)
            .await
            .map_err(|e| {
                conflict_on_unique(e, "Administrator with this username or email already exists")
            })?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Administrator not found")))
    }

    /// Batch delete with the self-deletion guard: a request reducing to
    /// exactly the caller's own id is a 400 with nothing deleted; otherwise
    /// the caller's id is reported under `blocked` and the rest proceeds.
    #[instrument(skip(db, ctx))]
    pub async fn delete_many(
        db: &PgPool,
        ctx: &CallerContext,
        ids: Vec<Uuid>,
    ) -> Result<DeleteReport, AppError> {
        let scope = require_write_scope(ctx, Resource::Administrations)?;

        let non_self: Vec<Uuid> = ids.iter().copied().filter(|id| *id != ctx.id).collect();
        if non_self.is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Cannot delete your own administrator account"
            )));
        }

        let mut blocked = Vec::new();
        if non_self.len() != ids.len() {
            blocked.push(BlockedDelete::new(
                ctx.id,
                "Cannot delete your own administrator account",
            ));
        }

        let allowed = scope.intersect_rows(&non_self);
        if allowed.is_empty() {
            return Ok(DeleteReport {
                deleted: 0,
                blocked,
            });
        }

        let deleted = Self::delete_scoped(db, ctx, &scope, &allowed).await?;
        Ok(DeleteReport { deleted, blocked })
    }

    async fn delete_scoped(
        db: &PgPool,
        ctx: &CallerContext,
        scope: &Scope,
        ids: &[Uuid],
    ) -> Result<u64, AppError> {
        let mut query = QueryBuilder::new("DELETE FROM administrations WHERE id = ANY(");
        query.push_bind(ids.to_vec());
        query.push(")");
        push_scope_predicate(&mut query, scope, &COLS);
        push_role_restriction(&mut query, ctx.role);
        // Super rows are never deleted through the API, not even by super.
        if ctx.role == Role::Super {
            query.push(" AND role <> 'super'");
        }

        let result = query.build().execute(db).await?;
        Ok(result.rows_affected())
    }
}
