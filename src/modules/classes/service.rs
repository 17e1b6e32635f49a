use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{
    AppError, BlockedDelete, CallerContext, DeleteReport, Resource, resolve_read_scope,
};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::db::conflict_on_unique;
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate, push_search_predicate};

use super::model::{
    Class, ClassListParams, ClassListResponse, ClassWithStats, CreateClassDto, UpdateClassDto,
};

/// Read queries join students for the enrollment count, so the scope columns
/// carry the table alias. A teacher's class scope constrains the class's own
/// primary key.
const JOINED_COLS: ScopeColumns = ScopeColumns {
    id: "c.id",
    school: "c.school_id",
    class: Some("c.id"),
    owner: None,
};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: Some("id"),
    owner: None,
};

const SELECT_WITH_STATS: &str = "SELECT c.id, c.name, c.category, c.school_id, c.form_master_id, \
     COUNT(s.id)::bigint AS student_count, c.created_at, c.updated_at \
     FROM classes c LEFT JOIN students s ON s.class_id = c.id WHERE 1=1";

const RETURNING: &str =
    "RETURNING id, name, category, school_id, form_master_id, created_at, updated_at";

/// Split delete candidates into deletable ids and guard-blocked entries.
fn partition_deletable(rows: &[(Uuid, i64)]) -> (Vec<Uuid>, Vec<BlockedDelete>) {
    let mut deletable = Vec::new();
    let mut blocked = Vec::new();
    for &(id, students) in rows {
        if students > 0 {
            blocked.push(BlockedDelete::with_students(
                id,
                "Class has enrolled students",
                students,
            ));
        } else {
            deletable.push(id);
        }
    }
    (deletable, blocked)
}

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: ClassListParams,
    ) -> Result<ClassListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Classes);
        if scope.is_empty() {
            return Ok(ClassListResponse {
                data: Vec::new(),
                total: 0,
            });
        }

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_scope_predicate(qb, &scope, &JOINED_COLS);
            if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
                push_search_predicate(qb, &["c.name"], search);
            }
            if let Some(category) = params.category.as_deref().filter(|c| !c.is_empty()) {
                qb.push(" AND c.category = ");
                qb.push_bind(category.to_string());
            }
            if let Some(school_id) = params.schoolid {
                qb.push(" AND c.school_id = ");
                qb.push_bind(school_id);
            }
        };

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM classes c WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT_WITH_STATS);
        filters(&mut query);
        query.push(" GROUP BY c.id ORDER BY c.name, c.category LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query
            .build_query_as::<ClassWithStats>()
            .fetch_all(db)
            .await?;

        Ok(ClassListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<ClassWithStats, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Classes);
        let mut query = QueryBuilder::new(SELECT_WITH_STATS);
        push_scope_predicate(&mut query, &scope, &JOINED_COLS);
        query.push(" AND c.id = ");
        query.push_bind(id);
        query.push(" GROUP BY c.id");

        query
            .build_query_as::<ClassWithStats>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class not found")))
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateClassDto,
    ) -> Result<Class, AppError> {
        let scope = require_write_scope(ctx, Resource::Classes)?;
        let school_id = resolve_target_school(&scope, dto.school_id)?;

        if let Some(form_master_id) = dto.form_master_id {
            Self::check_form_master(db, form_master_id, school_id).await?;
        }

        let class = sqlx::query_as::<_, Class>(&format!(
            "INSERT INTO classes (name, category, school_id, form_master_id) \
             VALUES ($1, $2, $3, $4) {RETURNING}"
        ))
        .bind(&dto.name)
        .bind(&dto.category)
        .bind(school_id)
        .bind(dto.form_master_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            conflict_on_unique(
                e,
                "Class with this name and category already exists in this school",
            )
        })?;

        Ok(class)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        let scope = require_write_scope(ctx, Resource::Classes)?;

        let mut lookup = QueryBuilder::new("SELECT school_id FROM classes WHERE 1=1");
        push_scope_predicate(&mut lookup, &scope, &COLS);
        lookup.push(" AND id = ");
        lookup.push_bind(id);
        let school_id: Uuid = lookup
            .build_query_scalar()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class not found")))?;

        if let Some(form_master_id) = dto.form_master_id {
            Self::check_form_master(db, form_master_id, school_id).await?;
        }

        let mut query = QueryBuilder::new("UPDATE classes SET updated_at = NOW()");
        if let Some(name) = &dto.name {
            query.push(", name = ");
            query.push_bind(name);
        }
        if let Some(category) = &dto.category {
            query.push(", category = ");
            query.push_bind(category);
        }
        if let Some(form_master_id) = dto.form_master_id {
            query.push(", form_master_id = ");
            query.push_bind(form_master_id);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" ");
        query.push(RETURNING);

        query
            .build_query_as::<Class>()
            .fetch_one(db)
            .await
            .map_err(|e| {
                conflict_on_unique(
                    e,
                    "Class with this name and category already exists in this school",
                )
            })
    }

    /// Batch delete. A class with enrolled students is never removed; it is
    /// reported under `blocked` with its student count instead.
    #[instrument(skip(db, ctx))]
    pub async fn delete_many(
        db: &PgPool,
        ctx: &CallerContext,
        ids: Vec<Uuid>,
    ) -> Result<DeleteReport, AppError> {
        let scope = require_write_scope(ctx, Resource::Classes)?;
        let allowed = scope.intersect_rows(&ids);
        if allowed.is_empty() {
            return Ok(DeleteReport::deleted_only(0));
        }

        let mut candidates = QueryBuilder::new(
            "SELECT c.id, COUNT(s.id)::bigint AS student_count \
             FROM classes c LEFT JOIN students s ON s.class_id = c.id \
             WHERE c.id = ANY(",
        );
        candidates.push_bind(allowed);
        candidates.push(")");
        push_scope_predicate(&mut candidates, &scope, &JOINED_COLS);
        candidates.push(" GROUP BY c.id");
        let rows: Vec<(Uuid, i64)> = candidates.build_query_as().fetch_all(db).await?;

        let (deletable, blocked) = partition_deletable(&rows);
        if deletable.is_empty() {
            return Ok(DeleteReport {
                deleted: 0,
                blocked,
            });
        }

        // The guard is re-checked inside the statement so an enrollment that
        // lands between the scan and the delete still blocks.
        let result = sqlx::query(
            "DELETE FROM classes WHERE id = ANY($1) \
             AND NOT EXISTS (SELECT 1 FROM students s WHERE s.class_id = classes.id)",
        )
        .bind(&deletable)
        .execute(db)
        .await?;

        Ok(DeleteReport {
            deleted: result.rows_affected(),
            blocked,
        })
    }

    async fn check_form_master(
        db: &PgPool,
        form_master_id: Uuid,
        school_id: Uuid,
    ) -> Result<(), AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1 AND school_id = $2)",
        )
        .bind(form_master_id)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Form master must be a teacher of the same school"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_keeps_empty_classes_deletable() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![(a, 0), (b, 12)];
        let (deletable, blocked) = partition_deletable(&rows);
        assert_eq!(deletable, vec![a]);
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].id, b);
        assert_eq!(blocked[0].students, Some(12));
    }

    #[test]
    fn test_partition_handles_all_blocked() {
        let rows = vec![(Uuid::new_v4(), 3)];
        let (deletable, blocked) = partition_deletable(&rows);
        assert!(deletable.is_empty());
        assert_eq!(blocked[0].reason, "Class has enrolled students");
    }
}
