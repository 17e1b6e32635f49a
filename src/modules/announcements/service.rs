use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, CallerContext, Resource, resolve_read_scope};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::scope_sql::{
    ScopeColumns, push_audience_predicate, push_scope_predicate, push_search_predicate,
};

use super::model::{
    Announcement, AnnouncementListParams, AnnouncementListResponse, CreateAnnouncementDto,
    UpdateAnnouncementDto,
};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: Some("class_id"),
    owner: None,
};

const SELECT: &str = "SELECT id, title, body, school_id, class_id, created_at, updated_at \
     FROM announcements WHERE 1=1";

const RETURNING: &str = "RETURNING id, title, body, school_id, class_id, created_at, updated_at";

pub struct AnnouncementService;

impl AnnouncementService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: AnnouncementListParams,
    ) -> Result<AnnouncementListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Announcements);
        if scope.is_empty() {
            return Ok(AnnouncementListResponse {
                data: Vec::new(),
                total: 0,
            });
        }

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_audience_predicate(qb, &scope, &COLS, &ctx.school_ids);
            if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
                push_search_predicate(qb, &["title"], search);
            }
            if let Some(school_id) = params.schoolid {
                qb.push(" AND school_id = ");
                qb.push_bind(school_id);
            }
            if let Some(class_id) = params.classid {
                qb.push(" AND class_id = ");
                qb.push_bind(class_id);
            }
        };

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM announcements WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<Announcement>().fetch_all(db).await?;

        Ok(AnnouncementListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<Announcement, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Announcements);
        let mut query = QueryBuilder::new(SELECT);
        push_audience_predicate(&mut query, &scope, &COLS, &ctx.school_ids);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<Announcement>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Announcement not found")))
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        let scope = require_write_scope(ctx, Resource::Announcements)?;
        let school_id = resolve_target_school(&scope, dto.school_id)?;

        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }

        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            "INSERT INTO announcements (title, body, school_id, class_id) \
             VALUES ($1, $2, $3, $4) {RETURNING}"
        ))
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(school_id)
        .bind(dto.class_id)
        .fetch_one(db)
        .await?;

        Ok(announcement)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        let scope = require_write_scope(ctx, Resource::Announcements)?;

        let mut lookup = QueryBuilder::new("SELECT school_id FROM announcements WHERE 1=1");
        push_scope_predicate(&mut lookup, &scope, &COLS);
        lookup.push(" AND id = ");
        lookup.push_bind(id);
        let school_id: Uuid = lookup
            .build_query_scalar()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Announcement not found")))?;

        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }

        let mut query = QueryBuilder::new("UPDATE announcements SET updated_at = NOW()");
        if let Some(title) = &dto.title {
            query.push(", title = ");
            query.push_bind(title);
        }
        if let Some(body) = &dto.body {
            query.push(", body = ");
            query.push_bind(body);
        }
        if let Some(class_id) = dto.class_id {
            query.push(", class_id = ");
            query.push_bind(class_id);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" ");
        query.push(RETURNING);

        Ok(query.build_query_as::<Announcement>().fetch_one(db).await?)
    }

    #[instrument(skip(db, ctx))]
    pub async fn delete(db: &PgPool, ctx: &CallerContext, id: Uuid) -> Result<(), AppError> {
        let scope = require_write_scope(ctx, Resource::Announcements)?;

        let mut query = QueryBuilder::new("DELETE FROM announcements WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &COLS);

        let result = query.build().execute(db).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Announcement not found"
            )));
        }
        Ok(())
    }

    async fn check_class(db: &PgPool, class_id: Uuid, school_id: Uuid) -> Result<(), AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1 AND school_id = $2)",
        )
        .bind(class_id)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Class must belong to the same school"
            )));
        }
        Ok(())
    }
}
