use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{
    AppError, CallerContext, DEFAULT_PASSWORD, DeleteReport, Resource, hash_password,
    resolve_read_scope,
};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::db::conflict_on_unique;
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate, push_search_predicate};

use super::model::{
    CreateParentDto, Parent, ParentListParams, ParentListResponse, UpdateParentDto,
};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: None,
    owner: None,
};

const SELECT: &str = "SELECT id, first_name, last_name, username, email, phone, school_id, \
     created_at, updated_at FROM parents WHERE 1=1";

const RETURNING: &str = "RETURNING id, first_name, last_name, username, email, phone, school_id, \
     created_at, updated_at";

pub struct ParentService;

impl ParentService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: ParentListParams,
    ) -> Result<ParentListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Parents);
        if scope.is_empty() {
            return Ok(ParentListResponse {
                data: Vec::new(),
                total: 0,
            });
        }

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_scope_predicate(qb, &scope, &COLS);
            if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
                push_search_predicate(
                    qb,
                    &["first_name", "last_name", "username", "email"],
                    search,
                );
            }
            if let Some(school_id) = params.schoolid {
                qb.push(" AND school_id = ");
                qb.push_bind(school_id);
            }
        };

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM parents WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY last_name, first_name LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<Parent>().fetch_all(db).await?;

        Ok(ParentListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(db: &PgPool, ctx: &CallerContext, id: Uuid) -> Result<Parent, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Parents);
        let mut query = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<Parent>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Parent not found")))
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateParentDto,
    ) -> Result<Parent, AppError> {
        let scope = require_write_scope(ctx, Resource::Parents)?;
        let school_id = resolve_target_school(&scope, dto.school_id)?;
        let password = hash_password(dto.password.as_deref().unwrap_or(DEFAULT_PASSWORD))?;

        let parent = sqlx::query_as::<_, Parent>(&format!(
            "INSERT INTO parents \
             (first_name, last_name, username, email, phone, password, school_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) {RETURNING}"
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&password)
        .bind(school_id)
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, "Parent with this username or email already exists"))?;

        Ok(parent)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateParentDto,
    ) -> Result<Parent, AppError> {
        let scope = require_write_scope(ctx, Resource::Parents)?;

        let mut query = QueryBuilder::new("UPDATE parents SET updated_at = NOW()");
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
        if let Some(phone) = &dto.phone {
            query.push(", phone = ");
            query.push_bind(phone);
        }
        if let Some(password) = &dto.password {
            let hashed = hash_password(password)?;
            query.push(", password = ");
            query.push_bind(hashed);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" ");
        query.push(RETURNING);

        query
            .build_query_as::<Parent>()
            .fetch_optional(db)
            .await
            .map_err(|e| {
                conflict_on_unique(e, "Parent with this username or email already exists")
            })?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Parent not found")))
    }

    /// Batch delete; children of a deleted parent keep their rows and lose
    /// the association through the FK.
    #[instrument(skip(db, ctx))]
    pub async fn delete_many(
        db: &PgPool,
        ctx: &CallerContext,
        ids: Vec<Uuid>,
    ) -> Result<DeleteReport, AppError> {
        let scope = require_write_scope(ctx, Resource::Parents)?;
        let allowed = scope.intersect_rows(&ids);
        if allowed.is_empty() {
            return Ok(DeleteReport::deleted_only(0));
        }

        let mut query = QueryBuilder::new("DELETE FROM parents WHERE id = ANY(");
        query.push_bind(allowed);
        query.push(")");
        push_scope_predicate(&mut query, &scope, &COLS);

        let result = query.build().execute(db).await?;
        Ok(DeleteReport::deleted_only(result.rows_affected()))
    }
}
