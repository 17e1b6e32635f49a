use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, CallerContext, Resource, Role, Scope, resolve_read_scope};

use crate::utils::authz::require_write_scope;
use crate::utils::scope_sql::{ScopeColumns, push_scope_predicate};

use super::model::{
    CreateGradeDto, Grade, GradeComponent, GradeComponentInput, GradeListParams,
    GradeListResponse, GradeWithComponents, UpdateGradeDto,
};

/// Grade ownership is two-sided: teachers own the rows they recorded,
/// students (and their parents) own the rows recorded about them. The scope
/// column follows the caller's role.
fn scope_cols(role: Role) -> ScopeColumns {
    ScopeColumns {
        id: "id",
        school: "school_id",
        class: None,
        owner: Some(match role {
            Role::Teacher => "teacher_id",
            _ => "student_id",
        }),
    }
}

const SELECT: &str = "SELECT id, student_id, subject_id, teacher_id, school_id, term, \
     created_at, updated_at FROM grades WHERE 1=1";

const RETURNING: &str = "RETURNING id, student_id, subject_id, teacher_id, school_id, term, \
     created_at, updated_at";

pub struct GradeService;

impl GradeService {
    #[instrument(skip(db, ctx))]
    pub async fn list(
        db: &PgPool,
        ctx: &CallerContext,
        params: GradeListParams,
    ) -> Result<GradeListResponse, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Grades);
        if scope.is_empty() {
            return Ok(GradeListResponse {
                data: Vec::new(),
                total: 0,
            });
        }
        let cols = scope_cols(ctx.role);

        let filters = |qb: &mut QueryBuilder<'_, Postgres>| {
            push_scope_predicate(qb, &scope, &cols);
            if let Some(school_id) = params.schoolid {
                qb.push(" AND school_id = ");
                qb.push_bind(school_id);
            }
            if let Some(student_id) = params.studentid {
                qb.push(" AND student_id = ");
                qb.push_bind(student_id);
            }
            if let Some(subject_id) = params.subjectid {
                qb.push(" AND subject_id = ");
                qb.push_bind(subject_id);
            }
            if let Some(term) = params.term.as_deref().filter(|t| !t.is_empty()) {
                qb.push(" AND term = ");
                qb.push_bind(term.to_string());
            }
        };

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM grades WHERE 1=1");
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(SELECT);
        filters(&mut query);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(params.pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(params.pagination.offset());
        let data = query.build_query_as::<Grade>().fetch_all(db).await?;

        Ok(GradeListResponse { data, total })
    }

    #[instrument(skip(db, ctx))]
    pub async fn get_by_id(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
    ) -> Result<GradeWithComponents, AppError> {
        let scope = resolve_read_scope(ctx, Resource::Grades);
        let cols = scope_cols(ctx.role);

        let mut query = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut query, &scope, &cols);
        query.push(" AND id = ");
        query.push_bind(id);

        let grade = query
            .build_query_as::<Grade>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Grade not found")))?;

        let components = Self::fetch_components(db, grade.id).await?;
        Ok(GradeWithComponents { grade, components })
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn create(
        db: &PgPool,
        ctx: &CallerContext,
        dto: CreateGradeDto,
    ) -> Result<GradeWithComponents, AppError> {
        let scope = require_write_scope(ctx, Resource::Grades)?;

        let school_id: Uuid =
            sqlx::query_scalar("SELECT school_id FROM students WHERE id = $1")
                .bind(dto.student_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Student not found")))?;

        let teacher_id = Self::authorize_target(db, ctx, &scope, &dto, school_id).await?;

        let mut tx = db.begin().await?;
        let grade = sqlx::query_as::<_, Grade>(&format!(
            "INSERT INTO grades (student_id, subject_id, teacher_id, school_id, term) \
             VALUES ($1, $2, $3, $4, $5) {RETURNING}"
        ))
        .bind(dto.student_id)
        .bind(dto.subject_id)
        .bind(teacher_id)
        .bind(school_id)
        .bind(&dto.term)
        .fetch_one(&mut *tx)
        .await?;

        let components = Self::insert_components(&mut tx, grade.id, &dto.components).await?;
        tx.commit().await?;

        Ok(GradeWithComponents { grade, components })
    }

    #[instrument(skip(db, ctx, dto))]
    pub async fn update(
        db: &PgPool,
        ctx: &CallerContext,
        id: Uuid,
        dto: UpdateGradeDto,
    ) -> Result<GradeWithComponents, AppError> {
        let scope = require_write_scope(ctx, Resource::Grades)?;
        let cols = scope_cols(ctx.role);

        let mut lookup = QueryBuilder::new(SELECT);
        push_scope_predicate(&mut lookup, &scope, &cols);
        lookup.push(" AND id = ");
        lookup.push_bind(id);
        let existing = lookup
            .build_query_as::<Grade>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Grade not found")))?;

        let mut tx = db.begin().await?;
        let grade = match &dto.term {
            Some(term) => {
                sqlx::query_as::<_, Grade>(&format!(
                    "UPDATE grades SET term = $1, updated_at = NOW() WHERE id = $2 {RETURNING}"
                ))
                .bind(term)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Grade>(&format!(
                    "UPDATE grades SET updated_at = NOW() WHERE id = $1 {RETURNING}"
                ))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let components = match &dto.components {
            Some(inputs) => {
                sqlx::query("DELETE FROM grade_components WHERE grade_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                Self::insert_components(&mut tx, id, inputs).await?
            }
            None => Self::fetch_components_tx(&mut tx, existing.id).await?,
        };
        tx.commit().await?;

        Ok(GradeWithComponents { grade, components })
    }

    /// Component rows cascade inside the same transaction so a failure never
    /// leaves orphans.
    #[instrument(skip(db, ctx))]
    pub async fn delete(db: &PgPool, ctx: &CallerContext, id: Uuid) -> Result<(), AppError> {
        let scope = require_write_scope(ctx, Resource::Grades)?;
        let cols = scope_cols(ctx.role);

        let mut tx = db.begin().await?;
        sqlx::query("DELETE FROM grade_components WHERE grade_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let mut query = QueryBuilder::new("DELETE FROM grades WHERE id = ");
        query.push_bind(id);
        push_scope_predicate(&mut query, &scope, &cols);
        let result = query.build().execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::not_found(anyhow::anyhow!("Grade not found")));
        }
        tx.commit().await?;
        Ok(())
    }

    /// Resolve the recording teacher and verify the caller may grade here.
    /// Teachers grade only subjects they own and always under their own id;
    /// school-scoped callers must stay inside their association and name a
    /// teacher of the same school.
    async fn authorize_target(
        db: &PgPool,
        ctx: &CallerContext,
        scope: &Scope,
        dto: &CreateGradeDto,
        school_id: Uuid,
    ) -> Result<Uuid, AppError> {
        let subject_school: Option<(Uuid, Option<Uuid>)> = sqlx::query_as(
            "SELECT school_id, teacher_id FROM subjects WHERE id = $1",
        )
        .bind(dto.subject_id)
        .fetch_optional(db)
        .await?;
        let (subject_school_id, subject_teacher_id) = subject_school
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Subject not found")))?;
        if subject_school_id != school_id {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Subject must belong to the same school as the student"
            )));
        }

        match scope {
            Scope::Owned(_) => {
                if subject_teacher_id != Some(ctx.id) {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Access denied - subject is not assigned to you"
                    )));
                }
                Ok(ctx.id)
            }
            _ => {
                if !scope.allows_school(school_id) {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Access denied - school is outside your association"
                    )));
                }
                let teacher_id = dto.teacher_id.or(subject_teacher_id).ok_or_else(|| {
                    AppError::bad_request(anyhow::anyhow!("teacher_id is required"))
                })?;
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
                Ok(teacher_id)
            }
        }
    }

    async fn insert_components(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        grade_id: Uuid,
        inputs: &[GradeComponentInput],
    ) -> Result<Vec<GradeComponent>, AppError> {
        let mut components = Vec::with_capacity(inputs.len());
        for input in inputs {
            let component = sqlx::query_as::<_, GradeComponent>(
                "INSERT INTO grade_components (grade_id, name, score, max_score) \
                 VALUES ($1, $2, $3, $4) RETURNING id, grade_id, name, score, max_score",
            )
            .bind(grade_id)
            .bind(&input.name)
            .bind(input.score)
            .bind(input.max_score)
            .fetch_one(&mut **tx)
            .await?;
            components.push(component);
        }
        Ok(components)
    }

    async fn fetch_components(db: &PgPool, grade_id: Uuid) -> Result<Vec<GradeComponent>, AppError> {
        Ok(sqlx::query_as::<_, GradeComponent>(
            "SELECT id, grade_id, name, score, max_score FROM grade_components \
             WHERE grade_id = $1 ORDER BY name",
        )
        .bind(grade_id)
        .fetch_all(db)
        .await?)
    }

    async fn fetch_components_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        grade_id: Uuid,
    ) -> Result<Vec<GradeComponent>, AppError> {
        Ok(sqlx::query_as::<_, GradeComponent>(
            "SELECT id, grade_id, name, score, max_score FROM grade_components \
             WHERE grade_id = $1 ORDER BY name",
        )
        .bind(grade_id)
        .fetch_all(&mut **tx)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teacher_scope_column_is_teacher_id() {
        assert_eq!(scope_cols(Role::Teacher).owner, Some("teacher_id"));
    }

    #[test]
    fn student_and_parent_scope_column_is_student_id() {
        assert_eq!(scope_cols(Role::Student).owner, Some("student_id"));
        assert_eq!(scope_cols(Role::Parent).owner, Some("student_id"));
    }
}
