use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{
    AppError, CallerContext, FileStorage, Resource, image_extension, resolve_read_scope,
    validate_image,
};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate};

use super::model::{GalleryItem, GalleryListParams};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: None,
    owner: None,
};

const SELECT: &str =
    "SELECT id, title, image_key, school_id, created_at FROM gallery_items WHERE 1=1";

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub struct GalleryService;

impl GalleryService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: &GalleryListParams,
    ) -> Result<(Vec<GalleryItem>, i64), AppError> {
        let scope = resolve_read_scope(ctx, Resource::Gallery);
        if scope.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_scope_predicate(qb, &scope, &COLS);
            if let Some(school_id) = params.schoolid {
                qb.push(" AND school_id = ");
                qb.push_bind(school_id);
            }
        };

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM gallery_items WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<GalleryItem>().fetch_all(db).await?;

        Ok((data, total))
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<GalleryItem, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Gallery);
        let mut query = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<GalleryItem>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Gallery item not found")))
    }

    #[instrument(skip(db, storage, ctx, content))]
    pub async fn upload(
        db: &PgPool,
        storage: &dyn FileStorage,
        ctx: &CallerContext,
        requested_school: Option<Uuid>,
        title: Option<String>,
        mime_type: &str,
        content: &[u8],
    ) -> Result<GalleryItem, AppError> {
        let scope = require_write_scope(ctx, Resource::Gallery)?;
        let school_id = resolve_target_school(&scope, requested_school)?;

        validate_image(mime_type, content.len(), MAX_IMAGE_BYTES)
            .map_err(|e| AppError::bad_request(anyhow::anyhow!(e.to_string())))?;

        let key = format!("gallery/{}.{}", Uuid::new_v4(), image_extension(mime_type));
        storage
            .save(&key, content)
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!(e.to_string())))?;

        let item = sqlx::query_as::<_, GalleryItem>(
            "INSERT INTO gallery_items (title, image_key, school_id) VALUES ($1, $2, $3) \
             RETURNING id, title, image_key, school_id, created_at",
        )
        .bind(&title)
        .bind(&key)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        Ok(item)
    }

    /// Row removal is the source of truth; storage cleanup is best-effort.
    #[instrument(skip(db, storage, ctx))]
    pub async fn delete(
        db: &PgPool,
        storage: &dyn FileStorage,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<(), AppError> {
        let scope = require_write_scope(ctx, Resource::Gallery)?;

        let mut query = QueryBuilder::new("DELETE FROM gallery_items WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" RETURNING image_key");

        let key: Option<String> = query.build_query_scalar().fetch_optional(db).await?;
        let key =
            key.ok_or_else(|| AppError::not_found(anyhow::anyhow!("Gallery item not found")))?;

        if let Err(e) = storage.delete(&key).await {
            tracing::warn!(key, error = %e, "Failed to delete stored file");
        }
        Ok(())
    }
}
