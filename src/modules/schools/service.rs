use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{
    AppError, CallerContext, FileStorage, Resource, Scope, image_extension, resolve_read_scope,
    validate_image,
};

use crate::utils::authz::require_write_scope;
use crate::utils::db::conflict_on_unique;
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate, push_search_predicate};

use super::model::{CreateSchoolDto, School, SchoolListParams, SchoolListResponse, UpdateSchoolDto};

/// For the schools table itself, the school column is the primary key.
const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "id",
    class: None,
    owner: None,
};

const SELECT: &str = "SELECT id, name, address, phone, email, logo, admission_prefix, \
     created_at, updated_at FROM schools WHERE 1=1";

const RETURNING: &str =
    "RETURNING id, name, address, phone, email, logo, admission_prefix, created_at, updated_at";

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub struct SchoolService;

impl SchoolService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: SchoolListParams,
    ) -> Result<SchoolListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Schools);
        if scope.is_empty() {
            return Ok(SchoolListResponse {
                data: Vec::new(),
                total: 0,
            });
        }

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_scope_predicate(qb, &scope, &COLS);
            if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
                push_search_predicate(qb, &["name"], search);
            }
        };

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM schools WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY name LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<School>().fetch_all(db).await?;

        Ok(SchoolListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<School, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Schools);
        let mut query = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<School>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School not found")))
    }

    /// Create a school. The controller restricts this to super callers.
    #[instrument(skip(db, dto))]
    pub async fn create(db: &PgPool, dto: CreateSchoolDto) -> Result<School, AppError> {
        let school = sqlx::query_as::<_, School>(&format!(
            "INSERT INTO schools (name, address, phone, email, admission_prefix) \
             VALUES ($1, $2, $3, $4, $5) {RETURNING}"
        ))
        .bind(&dto.name)
        .bind(&dto.address)
        .bind(&dto.phone)
        .bind(&dto.email)
        .bind(dto.admission_prefix.to_uppercase())
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, "School with this name already exists"))?;

        Ok(school)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateSchoolDto,
    ) -> Result<School, AppError> {
        let scope = require_write_scope(ctx, Resource::Schools)?;

        let mut query = QueryBuilder::new("UPDATE schools SET updated_at = NOW()");
        if let Some(name) = &dto.name {
            query.push(", name = ");
            query.push_bind(name);
        }
        if let Some(address) = &dto.address {
            query.push(", address = ");
            query.push_bind(address);
        }
        if let Some(phone) = &dto.phone {
            query.push(", phone = ");
            query.push_bind(phone);
        }
        if let Some(email) = &dto.email {
            query.push(", email = ");
            query.push_bind(email);
        }
        if let Some(prefix) = &dto.admission_prefix {
            query.push(", admission_prefix = ");
            query.push_bind(prefix.to_uppercase());
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" ");
        query.push(RETURNING);

        query
            .build_query_as::<School>()
            .fetch_optional(db)
            .await
            .map_err(|e| conflict_on_unique(e, "School with this name already exists"))?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School not found")))
    }

    /// Delete a school and, through FK cascades, everything in it. The
    /// controller restricts this to super callers.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("School not found")));
        }

        Ok(())
    }

    #[instrument(skip(db, storage, ctx, content))]
    pub async fn upload_logo(
        db: &PgPool,
        storage: &dyn FileStorage,
        ctx: &CallerContext,
        id: Uuid,
        mime_type: &str,
        content: &[u8],
    ) -> Result<School, AppError> {
        let scope = require_write_scope(ctx, Resource::Schools)?;
        let existing = Self::scoped_logo(db, &scope, id).await?;

        validate_image(mime_type, content.len(), MAX_IMAGE_BYTES)
            .map_err(|e| AppError::bad_request(anyhow::anyhow!(e.to_string())))?;

        let key = format!(
            "schools/{}-{}.{}",
            id,
            Uuid::new_v4(),
            image_extension(mime_type)
        );
        storage
            .save(&key, content)
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!(e.to_string())))?;

        let school = sqlx::query_as::<_, School>(&format!(
            "UPDATE schools SET logo = $1, updated_at = NOW() WHERE id = $2 {RETURNING}"
        ))
        .bind(&key)
        .bind(id)
        .fetch_one(db)
        .await?;

        if let Some(old_key) = existing {
            Self::cleanup(storage, &old_key).await;
        }

        Ok(school)
    }

    #[instrument(skip(db, storage, ctx))]
    pub async fn delete_logo(
        db: &PgPool,
        storage: &dyn FileStorage,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<School, AppError> {
        let scope = require_write_scope(ctx, Resource::Schools)?;
        let existing = Self::scoped_logo(db, &scope, id).await?;

        let school = sqlx::query_as::<_, School>(&format!(
            "UPDATE schools SET logo = NULL, updated_at = NOW() WHERE id = $1 {RETURNING}"
        ))
        .bind(id)
        .fetch_one(db)
        .await?;

        if let Some(old_key) = existing {
            Self::cleanup(storage, &old_key).await;
        }

        Ok(school)
    }

    /// Fetch the current logo key of a school the caller may write to, or
    /// 404 when the school is absent or out of scope.
    async fn scoped_logo(
        db: &PgPool,
        scope: &Scope,
        id: Uuid,
    ) -> Result<Option<String>, AppError> {
        let mut query = QueryBuilder::new("SELECT logo FROM schools WHERE 1=1");
        push_scope_predicate(&mut query, scope, &COLS);
        query.push(" AND id = ");
        query.push_bind(id);

        let row: Option<Option<String>> = query.build_query_scalar().fetch_optional(db).await?;
        row.ok_or_else(|| AppError::not_found(anyhow::anyhow!("School not found")))
    }

    /// Storage cleanup is best-effort; the row update is the source of truth.
    async fn cleanup(storage: &dyn FileStorage, key: &str) {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!(key, error = %e, "Failed to delete stored file");
        }
    }
}
