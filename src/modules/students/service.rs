use chrono::{Datelike, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{
    AppError, CallerContext, DEFAULT_PASSWORD, DeleteReport, Resource, admission,
    hash_password, resolve_read_scope,
};

use crate::utils::authz::{require_write_scope, resolve_target_school};
use crate::utils::db::conflict_on_unique;
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate, push_search_predicate};

use super::model::{
    CreateStudentDto, Student, StudentListParams, StudentListResponse, UpdateStudentDto,
};

const COLS: ScopeColumns = ScopeColumns {
    id: "id",
    school: "school_id",
    class: Some("class_id"),
    owner: None,
};

const SELECT: &str = "SELECT id, first_name, last_name, username, admission_number, school_id, \
     class_id, parent_id, date_of_birth, created_at, updated_at FROM students WHERE 1=1";

const RETURNING: &str = "RETURNING id, first_name, last_name, username, admission_number, \
     school_id, class_id, parent_id, date_of_birth, created_at, updated_at";

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: StudentListParams,
    ) -> Result<StudentListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Students);
        if scope.is_empty() {
            return Ok(StudentListResponse {
                data: Vec::new(),
                total: 0,
            });
        }

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_scope_predicate(qb, &scope, &COLS);
            if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
                push_search_predicate(
                    qb,
                    &["first_name", "last_name", "username", "admission_number"],
                    search,
                );
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

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM students WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY last_name, first_name LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<Student>().fetch_all(db).await?;

        Ok(StudentListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<Student, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Students);
        let mut query = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut query, &scope, &COLS);
        query.push(" AND id = ");
        query.push_bind(id);

        query
            .build_query_as::<Student>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))
    }

    /// Create a student, allocating the next admission number for the
    /// school's current year inside the same transaction as the insert.
    ///
    /// Allocation goes through an atomic per-school-per-year sequence row,
    /// seeded from the numbers already on record, so concurrent creates can
    /// never observe the same "next" value and legacy numbers can never be
    /// reissued.
    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateStudentDto,
    ) -> Result<Student, AppError> {
        let scope = require_write_scope(ctx, Resource::Students)?;
        let school_id = resolve_target_school(&scope, dto.school_id)?;

        let prefix: String =
            sqlx::query_scalar("SELECT admission_prefix FROM schools WHERE id = $1")
                .bind(school_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("School not found")))?;

        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }
        if let Some(parent_id) = dto.parent_id {
            Self::check_parent(db, parent_id, school_id).await?;
        }

        let password = hash_password(dto.password.as_deref().unwrap_or(DEFAULT_PASSWORD))?;
        let year = Utc::now().year();

        let mut tx = db.begin().await?;

        let existing: Vec<String> =
            sqlx::query_scalar("SELECT admission_number FROM students WHERE school_id = $1")
                .bind(school_id)
                .fetch_all(&mut *tx)
                .await?;
        let seed = admission::next_sequence(&existing, &prefix, year);

        let seq: i64 = sqlx::query_scalar(
            "INSERT INTO admission_sequences (school_id, year, seq) VALUES ($1, $2, $3) \
             ON CONFLICT (school_id, year) \
             DO UPDATE SET seq = GREATEST(admission_sequences.seq + 1, EXCLUDED.seq) \
             RETURNING seq",
        )
        .bind(school_id)
        .bind(year)
        .bind(i64::from(seed))
        .fetch_one(&mut *tx)
        .await?;

        let admission_number = admission::format_admission_number(&prefix, year, seq as u32);

        let student = sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students (first_name, last_name, username, password, admission_number, \
             school_id, class_id, parent_id, date_of_birth) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) {RETURNING}"
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.username)
        .bind(&password)
        .bind(&admission_number)
        .bind(school_id)
        .bind(dto.class_id)
        .bind(dto.parent_id)
        .bind(dto.date_of_birth)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            conflict_on_unique(e, "Student with this username or admission number already exists")
        })?;

        tx.commit().await?;
        Ok(student)
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let scope = require_write_scope(ctx, Resource::Students)?;

        let mut lookup = QueryBuilder::new("SELECT school_id FROM students WHERE 1=1");
        push_scope_predicate(&mut lookup, &scope, &COLS);
        lookup.push(" AND id = ");
        lookup.push_bind(id);
        let school_id: Uuid = lookup
            .build_query_scalar()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        if let Some(class_id) = dto.class_id {
            Self::check_class(db, class_id, school_id).await?;
        }
        if let Some(parent_id) = dto.parent_id {
            Self::check_parent(db, parent_id, school_id).await?;
        }

        let mut query = QueryBuilder::new("UPDATE students SET updated_at = NOW()");
        if let Some(first_name) = &dto.first_name {
            query.push(", first_name = ");
            query.push_bind(first_name);
        }
        if let Some(last_name) = &dto.last_name {
            query.push(", last_name = ");
            query.push_bind(last_name);
        }
        if let Some(password) = &dto.password {
            let hashed = hash_password(password)?;
            query.push(", password = ");
            query.push_bind(hashed);
        }
        if let Some(class_id) = dto.class_id {
            query.push(", class_id = ");
            query.push_bind(class_id);
        }
        if let Some(parent_id) = dto.parent_id {
            query.push(", parent_id = ");
            query.push_bind(parent_id);
        }
        if let Some(date_of_birth) = dto.date_of_birth {
            query.push(", date_of_birth = ");
            query.push_bind(date_of_birth);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" ");
        query.push(RETURNING);

        query
            .build_query_as::<Student>()
            .fetch_one(db)
            .await
            .map_err(|e| conflict_on_unique(e, "Student with this username already exists"))
    }

    /// Batch delete; grades of a deleted student go with them through the FK.
    #[instrument(skip(db, ctx))]
    pub async fn delete_many(
        db: &PgPool,
        ctx: &CallerContext,
        ids: Vec<Uuid>,
    ) -> Result<DeleteReport, AppError> {
        let scope = require_write_scope(ctx, Resource::Students)?;
        let allowed = scope.intersect_rows(&ids);
        if allowed.is_empty() {
            return Ok(DeleteReport::deleted_only(0));
        }

        let mut query = QueryBuilder::new("DELETE FROM students WHERE id = ANY(");
        query.push_bind(allowed);
        query.push(")");
        push_scope_predicate(&mut query, &scope, &COLS);

        let result = query.build().execute(db).await?;
        Ok(DeleteReport::deleted_only(result.rows_affected()))
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

    async fn check_parent(db: &PgPool, parent_id: Uuid, school_id: Uuid) -> Result<(), AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM parents WHERE id = $1 AND school_id = $2)",
        )
        .bind(parent_id)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Parent must belong to the same school"
            )));
        }
        Ok(())
    }
}
