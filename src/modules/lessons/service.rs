use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, CallerContext, Resource, resolve_read_scope};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate, push_search_predicate};

use super::model::{
    CreateLessonDto, Lesson, LessonListParams, LessonListResponse, UpdateLessonDto,
};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: Some("class_id"),
    owner: Some("teacher_id"),
};

const SELECT: &str = "SELECT id, name, school_id, class_id, subject_id, teacher_id, \
     start_time, end_time, created_at, updated_at FROM lessons WHERE 1=1";

const RETURNING: &str = "RETURNING id, name, school_id, class_id, subject_id, teacher_id, \
     start_time, end_time, created_at, updated_at";

fn check_times(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "End time must be after start time"
        )));
    }
    Ok(())
}

pub struct LessonService;

impl LessonService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: LessonListParams,
    ) -> Result<LessonListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Lessons);
        if scope.is_empty() {
            return Ok(LessonListResponse {
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

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM lessons WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY start_time LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<Lesson>().fetch_all(db).await?;

        Ok(LessonListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(db: &PgPool, ctx: &CallerContext, id: Uuid) -> Result<Lesson, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Lessons);
        let mut query = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<Lesson>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Lesson not found")))
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateLessonDto,
    ) -> Result<Lesson, AppError> {
        let scope = require_write_scope(ctx, Resource::Lessons)?;
        let school_id = resolve_target_school(&scope, dto.school_id)?;

        check_times(dto.start_time, dto.end_time)?;
        Self::check_class(db, dto.class_id, school_id).await?;
        if let Some(subject_id) = dto.subject_id {
            Self::check_subject(db, subject_id, school_id).await?;
        }
        if let Some(teacher_id) = dto.teacher_id {
            Self::check_teacher(db, teacher_id, school_id).await?;
        }

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "INSERT INTO lessons (name, school_id, class_id, subject_id, teacher_id, start_time, end_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) {RETURNING}"
        ))
        .bind(&dto.name)
        .bind(school_id)
        .bind(dto.class_id)
        .bind(dto.subject_id)
        .bind(dto.teacher_id)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .fetch_one(db)
        .await?;

        Ok(lesson)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateLessonDto,
    ) -> Result<Lesson, AppError> {
        let scope = require_write_scope(ctx, Resource::Lessons)?;

        let mut lookup = QueryBuilder::new(
            "SELECT school_id, start_time, end_time FROM lessons WHERE 1=1",
        );
        push_scope_predicate(&mut lookup, &scope, &COLS);
        lookup.push(" AND id = ");
        lookup.push_bind(id);
        let (school_id, start, end): (Uuid, DateTime<Utc>, DateTime<Utc>) = lookup
            .build_query_as()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Lesson not found")))?;

        check_times(dto.start_time.unwrap_or(start), dto.end_time.unwrap_or(end))?;
        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }
        if let Some(subject_id) = dto.subject_id {
            Self::check_subject(db, subject_id, school_id).await?;
        }
        if let Some(teacher_id) = dto.teacher_id {
            Self::check_teacher(db, teacher_id, school_id).await?;
        }

        let mut query = QueryBuilder::new("UPDATE lessons SET updated_at = NOW()");
        if let Some(name) = &dto.name {
            query.push(", name = ");
            query.push_bind(name);
        }
        if let Some(class_id) = dto.class_id {
            query.push(", class_id = ");
            query.push_bind(class_id);
        }
        if let Some(subject_id) = dto.subject_id {
            query.push(", subject_id = ");
            query.push_bind(subject_id);
        }
        if let Some(teacher_id) = dto.teacher_id {
            query.push(", teacher_id = ");
            query.push_bind(teacher_id);
        }
        if let Some(start_time) = dto.start_time {
            query.push(", start_time = ");
            query.push_bind(start_time);
        }
        if let Some(end_time) = dto.end_time {
            query.push(", end_time = ");
            query.push_bind(end_time);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" ");
        query.push(RETURNING);

        Ok(query.build_query_as::<Lesson>().fetch_one(db).await?)
    }

    #[instrument(skip(db, ctx))]
    pub async fn delete(db: &PgPool, ctx: &CallerContext, id: Uuid) -> Result<(), AppError> {
        let scope = require_write_scope(ctx, Resource::Lessons)?;

        let mut query = QueryBuilder::new("DELETE FROM lessons WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &COLS);

        let result = query.build().execute(db).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Lesson not found")));
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

    async fn check_subject(db: &PgPool, subject_id: Uuid, school_id: Uuid) -> Result<(), AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1 AND school_id = $2)",
        )
        .bind(subject_id)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Subject must belong to the same school"
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_end_before_start() {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        assert!(check_times(start, end).is_err());
        assert!(check_times(start, start).is_err());
    }

    #[test]
    fn accepts_ordered_times() {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 9, 1, 11, 0, 0).unwrap();
        assert!(check_times(start, end).is_ok());
    }
}
