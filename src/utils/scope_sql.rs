//! Translation of a [`Scope`] into a SQL predicate.
//!
//! Scope predicates mix text search parameters with uuid-array binds, so the
//! services build their queries with [`sqlx::QueryBuilder`] and append the
//! scope filter through [`push_scope_predicate`]. Each resource declares
//! which columns its scope variants constrain via [`ScopeColumns`]; a scope
//! variant the resource has no column for can never match and degrades to
//! `FALSE` rather than to an unscoped query.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use scolara_core::Scope;

/// Column names a resource exposes to the scoping policy.
#[derive(Debug, Clone, Copy)]
pub struct ScopeColumns {
    /// Primary key column.
    pub id: &'static str,
    /// The `school_id` foreign key.
    pub school: &'static str,
    /// The `class_id` foreign key, for class-scoped resources.
    pub class: Option<&'static str>,
    /// The ownership column (`teacher_id`, `student_id`), where one exists.
    pub owner: Option<&'static str>,
}

fn push_any(qb: &mut QueryBuilder<'_, Postgres>, column: &str, ids: &[Uuid]) {
    qb.push(" AND ");
    qb.push(column);
    qb.push(" = ANY(");
    qb.push_bind(ids.to_vec());
    qb.push(")");
}

/// Append the scope's row filter to a query ending in a WHERE clause.
///
/// Non-super callers never run an unscoped query: every variant either
/// narrows the result set or pins it to `FALSE`.
pub fn push_scope_predicate(
    qb: &mut QueryBuilder<'_, Postgres>,
    scope: &Scope,
    cols: &ScopeColumns,
) {
    match scope {
        Scope::Unrestricted => {}
        Scope::Empty => {
            qb.push(" AND FALSE");
        }
        Scope::Schools(ids) => push_any(qb, cols.school, ids),
        Scope::Classes(ids) => match cols.class {
            Some(column) => push_any(qb, column, ids),
            None => {
                qb.push(" AND FALSE");
            }
        },
        Scope::Owned(ids) => match cols.owner {
            Some(column) => push_any(qb, column, ids),
            None => {
                qb.push(" AND FALSE");
            }
        },
        Scope::Rows(ids) => push_any(qb, cols.id, ids),
    }
}

/// Scope filter for audience-addressed rows (announcements, events), where a
/// NULL `class_id` means "the whole school". A class-scoped caller sees rows
/// addressed to their classes plus the school-wide rows of their own school;
/// every other variant behaves as in [`push_scope_predicate`].
pub fn push_audience_predicate(
    qb: &mut QueryBuilder<'_, Postgres>,
    scope: &Scope,
    cols: &ScopeColumns,
    school_ids: &[Uuid],
) {
    match scope {
        Scope::Classes(class_ids) => match cols.class {
            Some(class_col) => {
                qb.push(" AND (");
                qb.push(class_col);
                qb.push(" = ANY(");
                qb.push_bind(class_ids.to_vec());
                qb.push(") OR (");
                qb.push(class_col);
                qb.push(" IS NULL AND ");
                qb.push(cols.school);
                qb.push(" = ANY(");
                qb.push_bind(school_ids.to_vec());
                qb.push(")))");
            }
            None => {
                qb.push(" AND FALSE");
            }
        },
        other => push_scope_predicate(qb, other, cols),
    }
}

/// Append a case-insensitive substring match across the given columns.
pub fn push_search_predicate(
    qb: &mut QueryBuilder<'_, Postgres>,
    columns: &[&str],
    search: &str,
) {
    let pattern = format!("%{}%", search);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column);
        qb.push(" ILIKE ");
        qb.push_bind(pattern.clone());
    }
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLS: ScopeColumns = ScopeColumns {
        id: "id",
        school: "school_id",
        class: Some("class_id"),
        owner: Some("teacher_id"),
    };

    fn sql_for(scope: &Scope, cols: &ScopeColumns) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM t WHERE 1=1");
        push_scope_predicate(&mut qb, scope, cols);
        qb.into_sql()
    }

    #[test]
    fn test_unrestricted_adds_nothing() {
        assert_eq!(
            sql_for(&Scope::Unrestricted, &COLS),
            "SELECT * FROM t WHERE 1=1"
        );
    }

    #[test]
    fn test_empty_matches_nothing() {
        assert!(sql_for(&Scope::Empty, &COLS).ends_with("AND FALSE"));
    }

    #[test]
    fn test_school_scope_filters_school_column() {
        let sql = sql_for(&Scope::Schools(vec![Uuid::new_v4()]), &COLS);
        assert!(sql.contains("school_id = ANY($1)"));
    }

    #[test]
    fn test_class_scope_without_class_column_is_false() {
        let cols = ScopeColumns {
            class: None,
            ..COLS
        };
        let sql = sql_for(&Scope::Classes(vec![Uuid::new_v4()]), &cols);
        assert!(sql.ends_with("AND FALSE"));
    }

    #[test]
    fn test_owned_scope_uses_owner_column() {
        let sql = sql_for(&Scope::Owned(vec![Uuid::new_v4()]), &COLS);
        assert!(sql.contains("teacher_id = ANY($1)"));
    }

    #[test]
    fn test_rows_scope_uses_id_column() {
        let sql = sql_for(&Scope::Rows(vec![Uuid::new_v4()]), &COLS);
        assert!(sql.contains("id = ANY($1)"));
    }

    #[test]
    fn test_audience_predicate_includes_school_wide_rows() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM t WHERE 1=1");
        push_audience_predicate(
            &mut qb,
            &Scope::Classes(vec![Uuid::new_v4()]),
            &COLS,
            &[Uuid::new_v4()],
        );
        let sql = qb.into_sql();
        assert!(sql.contains("class_id = ANY($1)"));
        assert!(sql.contains("class_id IS NULL AND school_id = ANY($2)"));
    }

    #[test]
    fn test_audience_predicate_delegates_other_scopes() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM t WHERE 1=1");
        push_audience_predicate(&mut qb, &Scope::Schools(vec![Uuid::new_v4()]), &COLS, &[]);
        assert!(qb.into_sql().contains("school_id = ANY($1)"));
    }

    #[test]
    fn test_search_predicate_spans_columns() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM t WHERE 1=1");
        push_search_predicate(&mut qb, &["first_name", "last_name"], "ade");
        let sql = qb.into_sql();
        assert!(sql.contains("first_name ILIKE $1"));
        assert!(sql.contains("OR last_name ILIKE $2"));
    }
}
