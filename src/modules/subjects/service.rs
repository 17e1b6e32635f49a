use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, CallerContext, Resource, resolve_read_scope};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate, push_search_predicate};

use super::model::{
    CreateSubjectDto, Subject, SubjectListParams, SubjectListResponse, UpdateSubjectDto,
};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: Some("class_id"),
    owner: Some("teacher_id"),
};

const SELECT: &str = "SELECT id, name, school_id, class_id, teacher_id, created_at, updated_at \
     FROM subjects WHERE 1=1";

const RETURNING: &str = "RETURNING id, name, school_id, class_id, teacher_id, created_at, updated_at";

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: SubjectListParams,
    ) -> Result<SubjectListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Subjects);
        if scope.is_empty() {
            return Ok(SubjectListResponse {
                data: Vec::new(),
                total: 0,
            });
        }

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_scope_predicate(qb, &scope, &COLS);
            if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
                push_search_predicate(qb, &["name"], search);
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

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM subjects WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY name LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<Subject>().fetch_all(db).await?;

        Ok(SubjectListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<Subject, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Subjects);
        let mut query = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<Subject>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Subject not found")))
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateSubjectDto,
    ) -> Result<Subject, AppError> {
        let scope = require_write_scope(ctx, Resource::Subjects)?;
        let school_id = resolve_target_school(&scope, dto.school_id)?;

        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }
        if let Some(teacher_id) = dto.teacher_id {
            Self::check_teacher(db, teacher_id, school_id).await?;
        }

        let subject = sqlx::query_as::<_, Subject>(&format!(
            "INSERT INTO subjects (name, school_id, class_id, teacher_id) \
             VALUES ($1, $2, $3, $4) {RETURNING}"
        ))
        .bind(&dto.name)
        .bind(school_id)
        .bind(dto.class_id)
        .bind(dto.teacher_id)
        .fetch_one(db)
        .await?;

        Ok(subject)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let scope = require_write_scope(ctx, Resource::Subjects)?;

        let mut lookup = QueryBuilder::new("SELECT school_id FROM subjects WHERE 1=1");
        push_scope_predicate(&mut lookup, &scope, &COLS);
        lookup.push(" AND id = ");
        lookup.push_bind(id);
        let school_id: Uuid = lookup
            .build_query_scalar()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Subject not found")))?;

        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }
        if let Some(teacher_id) = dto.teacher_id {
            Self::check_teacher(db, teacher_id, school_id).await?;
        }

        let mut query = QueryBuilder::new("UPDATE subjects SET updated_at = NOW()");
        if let Some(name) = &dto.name {
            query.push(", name = ");
            query.push_bind(name);
        }
        if let Some(class_id) = dto.class_id {
            query.push(", class_id = ");
            query.push_bind(class_id);
        }
        if let Some(teacher_id) = dto.teacher_id {
            query.push(", teacher_id = ");
            query.push_bind(teacher_id);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" ");
        query.push(RETURNING);

        Ok(query.build_query_as::<Subject>().fetch_one(db).await?)
    }

    #[instrument(skip(db, ctx))]
    pub async fn delete(db: &PgPool, ctx: &CallerContext, id: Uuid) -> Result<(), AppError> {
        let scope = require_write_scope(ctx, Resource::Subjects)?;

        let mut query = QueryBuilder::new("DELETE FROM subjects WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &COLS);

        let result = query.build().execute(db).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Subject not found")));
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

    async fn check_teacher(db: &PgPool, teacher_id: Uuid, school_id: Uuid) -> Result<(), AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1 AND school_id = $2)",
        )
        .bind(teacher_id)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Teacher must belong to the same school"
            )));
        }
        Ok(())
    }
}
