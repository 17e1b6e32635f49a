use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, CallerContext, Resource, resolve_read_scope};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::scope_sql::{
    ScopeColumns, push_audience_predicate, push_scope_predicate, push_search_predicate,
};

use super::model::{CreateEventDto, Event, EventListParams, EventListResponse, UpdateEventDto};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: Some("class_id"),
    owner: None,
};

const SELECT: &str = "SELECT id, title, description, school_id, class_id, start_time, end_time, \
     created_at, updated_at FROM events WHERE 1=1";

const RETURNING: &str = "RETURNING id, title, description, school_id, class_id, start_time, \
     end_time, created_at, updated_at";

fn check_times(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "End time must be after start time"
        )));
    }
    Ok(())
}

pub struct EventService;

impl EventService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: EventListParams,
    ) -> Result<EventListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Events);
        if scope.is_empty() {
            return Ok(EventListResponse {
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
            if let Some(from) = params.from {
                qb.push(" AND start_time >= ");
                qb.push_bind(from);
            }
            if let Some(to) = params.to {
                qb.push(" AND start_time <= ");
                qb.push_bind(to);
            }
        };

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM events WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY start_time LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<Event>().fetch_all(db).await?;

        Ok(EventListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(db: &PgPool, ctx: &CallerContext, id: Uuid) -> Result<Event, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Events);
        let mut query = QueryBuilder::new(SELECT);
        push_audience_predicate(&mut query, &scope, &COLS, &ctx.school_ids);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<Event>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Event not found")))
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateEventDto,
    ) -> Result<Event, AppError> {
        let scope = require_write_scope(ctx, Resource::Events)?;
        let school_id = resolve_target_school(&scope, dto.school_id)?;

        check_times(dto.start_time, dto.end_time)?;
        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }

        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (title, description, school_id, class_id, start_time, end_time) \
             VALUES ($1, $2, $3, $4, $5, $6) {RETURNING}"
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(school_id)
        .bind(dto.class_id)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .fetch_one(db)
        .await?;

        Ok(event)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateEventDto,
    ) -> Result<Event, AppError> {
        let scope = require_write_scope(ctx, Resource::Events)?;

        let mut lookup = QueryBuilder::new(
            "SELECT school_id, start_time, end_time FROM events WHERE 1=1",
        );
        push_scope_predicate(&mut lookup, &scope, &COLS);
        lookup.push(" AND id = ");
        lookup.push_bind(id);
        let (school_id, start, end): (Uuid, DateTime<Utc>, DateTime<Utc>) = lookup
            .build_query_as()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Event not found")))?;

        check_times(dto.start_time.unwrap_or(start), dto.end_time.unwrap_or(end))?;
        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }

        let mut query = QueryBuilder::new("UPDATE events SET updated_at = NOW()");
        if let Some(title) = &dto.title {
            query.push(", title = ");
            query.push_bind(title);
        }
        if let Some(description) = &dto.description {
            query.push(", description = ");
            query.push_bind(description);
        }
        if let Some(class_id) = dto.class_id {
            query.push(", class_id = ");
            query.push_bind(class_id);
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

        Ok(query.build_query_as::<Event>().fetch_one(db).await?)
    }

    #[instrument(skip(db, ctx))]
    pub async fn delete(db: &PgPool, ctx: &CallerContext, id: Uuid) -> Result<(), AppError> {
        let scope = require_write_scope(ctx, Resource::Events)?;

        let mut query = QueryBuilder::new("DELETE FROM events WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &COLS);

        let result = query.build().execute(db).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Event not found")));
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_unordered_times() {
        let start = Utc.with_ymd_and_hms(2025, 12, 12, 12, 0, 0).unwrap();
        assert!(check_times(start, start).is_err());
        assert!(check_times(start, start - chrono::Duration::hours(1)).is_err());
        assert!(check_times(start, start + chrono::Duration::hours(1)).is_ok());
    }
}
