//! Roles, caller context, and the row-scoping calculator.
//!
//! Every request handler derives a [`Scope`] — the subset of rows the caller
//! may touch for one resource — from the caller's [`Role`] and school
//! association, then translates it into a query filter. The calculator here
//! is pure with respect to an already-fetched [`CallerContext`]; loading the
//! context (the caller's school associations, form-master classes, children)
//! is the application's job and happens once per request.
//!
//! The contract, per role:
//!
//! - `super`: unrestricted. May narrow reads with an explicit school filter.
//! - `management` / `admin`: restricted to the caller's associated school(s).
//!   No association ⇒ reads resolve to [`Scope::Empty`], writes are denied.
//! - `teacher`: form-master classes for students/classes, ownership
//!   (`teacher_id`) for subjects/lessons/grades, own school otherwise.
//! - `student`: self only, or the student's own class for class-scoped
//!   resources.
//! - `parent`: rows derived from the caller's children.
//! - Any role/resource pair without a rule resolves to [`Scope::Empty`].
//!
//! Mutation scope is always a subset of (or equal to) read scope for the
//! same role; `write_scope_is_subset_of_read_scope` in the tests pins that
//! down across the whole table.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error message returned when a scoped write has no school to land in.
pub const NO_SCHOOL_ASSOCIATION: &str = "Access denied - no school association found";

/// The six caller roles, in escalating-then-narrowing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Super,
    Management,
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Super => "super",
            Role::Management => "management",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "super" => Some(Role::Super),
            "management" => Some(Role::Management),
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            "parent" => Some(Role::Parent),
            _ => None,
        }
    }

    /// Roles that hold an administration record (school staff hierarchy).
    pub fn is_administrative(&self) -> bool {
        matches!(self, Role::Super | Role::Management | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resources the scoping policy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Schools,
    Administrations,
    Teachers,
    Students,
    Parents,
    Classes,
    Subjects,
    Lessons,
    Grades,
    Announcements,
    Events,
    Gallery,
}

/// Everything the scope calculator needs about the caller, fetched once per
/// request and discarded afterwards.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub id: Uuid,
    pub role: Role,
    /// Associated school ids. Zero, one, or many (multi-school callers).
    pub school_ids: Vec<Uuid>,
    /// Classes where the caller is form master (teachers only).
    pub form_class_ids: Vec<Uuid>,
    /// The caller's own class (students only).
    pub class_id: Option<Uuid>,
    /// The caller's children (parents only; student ids).
    pub child_ids: Vec<Uuid>,
    /// The classes the caller's children are enrolled in (parents only).
    pub child_class_ids: Vec<Uuid>,
}

impl CallerContext {
    /// A context carrying only identity and role, for roles that need no
    /// relation lookups (super) or as a starting point before loading.
    pub fn bare(id: Uuid, role: Role) -> Self {
        Self {
            id,
            role,
            school_ids: Vec::new(),
            form_class_ids: Vec::new(),
            class_id: None,
            child_ids: Vec::new(),
            child_class_ids: Vec::new(),
        }
    }
}

/// A derived read/write row filter.
///
/// The column each variant constrains is resource-specific and chosen where
/// the scope is turned into SQL: `Schools` constrains the `school_id` FK,
/// `Classes` the `class_id` FK, `Owned` the resource's ownership column
/// (`teacher_id` for subjects and lessons, `student_id` for grades), and
/// `Rows` the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Unrestricted,
    Schools(Vec<Uuid>),
    Classes(Vec<Uuid>),
    Owned(Vec<Uuid>),
    Rows(Vec<Uuid>),
    Empty,
}

impl Scope {
    /// Whether the scope can never match a row.
    pub fn is_empty(&self) -> bool {
        match self {
            Scope::Empty => true,
            Scope::Unrestricted => false,
            Scope::Schools(ids) | Scope::Classes(ids) | Scope::Owned(ids) | Scope::Rows(ids) => {
                ids.is_empty()
            }
        }
    }

    /// Whether a write targeting `school_id` is inside this scope.
    ///
    /// Only school-shaped scopes can admit a create: relation-derived scopes
    /// (classes, ownership, row sets) are checked against the specific rows
    /// by the service instead.
    pub fn allows_school(&self, school_id: Uuid) -> bool {
        match self {
            Scope::Unrestricted => true,
            Scope::Schools(ids) => ids.contains(&school_id),
            _ => false,
        }
    }

    /// Restrict a requested id set to the ids this scope could ever match.
    /// Used by batch deletes: the server re-derives the allowed subset
    /// instead of trusting the client. Row-set scopes are filtered here;
    /// school/class/ownership scopes are applied in the query itself.
    pub fn intersect_rows(&self, requested: &[Uuid]) -> Vec<Uuid> {
        match self {
            Scope::Empty => Vec::new(),
            Scope::Rows(allowed) | Scope::Owned(allowed) => requested
                .iter()
                .copied()
                .filter(|id| allowed.contains(id))
                .collect(),
            _ => requested.to_vec(),
        }
    }
}

/// Why a write scope could not be derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeDenied {
    /// The role is not in the resource's allowed-writer set.
    NotPermitted,
    /// The role could write, but has no school association to write into.
    NoSchool,
}

impl ScopeDenied {
    pub fn message(&self) -> &'static str {
        match self {
            ScopeDenied::NotPermitted => "Access denied - insufficient privileges",
            ScopeDenied::NoSchool => NO_SCHOOL_ASSOCIATION,
        }
    }
}

fn non_empty(ids: &[Uuid]) -> Option<Vec<Uuid>> {
    if ids.is_empty() { None } else { Some(ids.to_vec()) }
}

/// Compute the read scope for `(caller, resource)`.
///
/// Never fails: a caller who may read nothing gets [`Scope::Empty`], which
/// list endpoints turn into `{ data: [], total: 0 }` rather than an error.
pub fn resolve_read_scope(ctx: &CallerContext, resource: Resource) -> Scope {
    use Resource::*;

    match ctx.role {
        Role::Super => Scope::Unrestricted,

        Role::Management | Role::Admin => match non_empty(&ctx.school_ids) {
            Some(ids) => Scope::Schools(ids),
            None => Scope::Empty,
        },

        Role::Teacher => match resource {
            Students | Classes => match non_empty(&ctx.form_class_ids) {
                Some(ids) => Scope::Classes(ids),
                None => Scope::Empty,
            },
            Subjects | Lessons | Grades => Scope::Owned(vec![ctx.id]),
            Teachers => Scope::Rows(vec![ctx.id]),
            Schools | Announcements | Events | Gallery => match non_empty(&ctx.school_ids) {
                Some(ids) => Scope::Schools(ids),
                None => Scope::Empty,
            },
            Administrations | Parents => Scope::Empty,
        },

        Role::Student => match resource {
            Students => Scope::Rows(vec![ctx.id]),
            Grades => Scope::Owned(vec![ctx.id]),
            Subjects | Lessons | Announcements | Events => match ctx.class_id {
                Some(class_id) => Scope::Classes(vec![class_id]),
                None => Scope::Empty,
            },
            Schools | Gallery => match non_empty(&ctx.school_ids) {
                Some(ids) => Scope::Schools(ids),
                None => Scope::Empty,
            },
            Administrations | Teachers | Parents | Classes => Scope::Empty,
        },

        Role::Parent => match resource {
            Students => match non_empty(&ctx.child_ids) {
                Some(ids) => Scope::Rows(ids),
                None => Scope::Empty,
            },
            Grades => match non_empty(&ctx.child_ids) {
                Some(ids) => Scope::Owned(ids),
                None => Scope::Empty,
            },
            Lessons | Announcements | Events => match non_empty(&ctx.child_class_ids) {
                Some(ids) => Scope::Classes(ids),
                None => Scope::Empty,
            },
            Parents => Scope::Rows(vec![ctx.id]),
            Schools | Gallery => match non_empty(&ctx.school_ids) {
                Some(ids) => Scope::Schools(ids),
                None => Scope::Empty,
            },
            Administrations | Teachers | Classes | Subjects => Scope::Empty,
        },
    }
}

/// Compute the write (create/update/delete) scope for `(caller, resource)`.
///
/// Unlike reads, an impossible write is an error: a role outside the
/// resource's allowed-writer set gets [`ScopeDenied::NotPermitted`], and an
/// administrative role with no school association gets
/// [`ScopeDenied::NoSchool`] (HTTP 403 in both cases).
pub fn resolve_write_scope(
    ctx: &CallerContext,
    resource: Resource,
) -> Result<Scope, ScopeDenied> {
    use Resource::*;

    if ctx.role == Role::Super {
        return Ok(Scope::Unrestricted);
    }

    let school_scope = || -> Result<Scope, ScopeDenied> {
        match non_empty(&ctx.school_ids) {
            Some(ids) => Ok(Scope::Schools(ids)),
            None => Err(ScopeDenied::NoSchool),
        }
    };

    match resource {
        // Only super creates or deletes schools; management/admin may update
        // their own school (logo, admission prefix).
        Schools => match ctx.role {
            Role::Management | Role::Admin => school_scope(),
            _ => Err(ScopeDenied::NotPermitted),
        },

        Administrations => match ctx.role {
            // Admin is further restricted to `role = admin` rows within the
            // school; the administrations service enforces that sub-filter.
            Role::Management | Role::Admin => school_scope(),
            _ => Err(ScopeDenied::NotPermitted),
        },

        Teachers | Students | Parents | Classes | Subjects | Lessons | Announcements | Events
        | Gallery => match ctx.role {
            Role::Management | Role::Admin => school_scope(),
            _ => Err(ScopeDenied::NotPermitted),
        },

        Grades => match ctx.role {
            Role::Management | Role::Admin => school_scope(),
            // Teachers grade the subjects they own.
            Role::Teacher => Ok(Scope::Owned(vec![ctx.id])),
            _ => Err(ScopeDenied::NotPermitted),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_RESOURCES: [Resource; 12] = [
        Resource::Schools,
        Resource::Administrations,
        Resource::Teachers,
        Resource::Students,
        Resource::Parents,
        Resource::Classes,
        Resource::Subjects,
        Resource::Lessons,
        Resource::Grades,
        Resource::Announcements,
        Resource::Events,
        Resource::Gallery,
    ];

    const ALL_ROLES: [Role; 6] = [
        Role::Super,
        Role::Management,
        Role::Admin,
        Role::Teacher,
        Role::Student,
        Role::Parent,
    ];

    fn ctx_with_school(role: Role) -> CallerContext {
        let mut ctx = CallerContext::bare(Uuid::new_v4(), role);
        ctx.school_ids = vec![Uuid::new_v4()];
        ctx
    }

    #[test]
    fn super_is_unrestricted_everywhere() {
        let ctx = CallerContext::bare(Uuid::new_v4(), Role::Super);
        for resource in ALL_RESOURCES {
            assert_eq!(resolve_read_scope(&ctx, resource), Scope::Unrestricted);
            assert_eq!(resolve_write_scope(&ctx, resource), Ok(Scope::Unrestricted));
        }
    }

    #[test]
    fn management_without_school_reads_empty() {
        let ctx = CallerContext::bare(Uuid::new_v4(), Role::Management);
        for resource in ALL_RESOURCES {
            assert_eq!(resolve_read_scope(&ctx, resource), Scope::Empty);
        }
    }

    #[test]
    fn management_without_school_cannot_write() {
        let ctx = CallerContext::bare(Uuid::new_v4(), Role::Management);
        let denied = resolve_write_scope(&ctx, Resource::Classes).unwrap_err();
        assert_eq!(denied, ScopeDenied::NoSchool);
        assert_eq!(denied.message(), "Access denied - no school association found");
    }

    #[test]
    fn admin_scoped_to_own_school() {
        let ctx = ctx_with_school(Role::Admin);
        let school = ctx.school_ids[0];
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Students),
            Scope::Schools(vec![school])
        );
        let write = resolve_write_scope(&ctx, Resource::Students).unwrap();
        assert!(write.allows_school(school));
        assert!(!write.allows_school(Uuid::new_v4()));
    }

    #[test]
    fn multi_school_caller_scope_is_the_whole_set() {
        let mut ctx = CallerContext::bare(Uuid::new_v4(), Role::Management);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        ctx.school_ids = vec![a, b];
        let scope = resolve_write_scope(&ctx, Resource::Teachers).unwrap();
        assert!(scope.allows_school(a));
        assert!(scope.allows_school(b));
        assert!(!scope.allows_school(Uuid::new_v4()));
    }

    #[test]
    fn teacher_students_scope_is_form_master_classes() {
        let mut ctx = ctx_with_school(Role::Teacher);
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        ctx.form_class_ids = vec![c1, c2];
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Students),
            Scope::Classes(vec![c1, c2])
        );
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Classes),
            Scope::Classes(vec![c1, c2])
        );
    }

    #[test]
    fn teacher_without_classes_reads_empty_students() {
        let ctx = ctx_with_school(Role::Teacher);
        assert_eq!(resolve_read_scope(&ctx, Resource::Students), Scope::Empty);
    }

    #[test]
    fn teacher_owns_subjects_lessons_grades() {
        let ctx = ctx_with_school(Role::Teacher);
        for resource in [Resource::Subjects, Resource::Lessons, Resource::Grades] {
            assert_eq!(
                resolve_read_scope(&ctx, resource),
                Scope::Owned(vec![ctx.id])
            );
        }
    }

    #[test]
    fn teacher_cannot_write_students() {
        let mut ctx = ctx_with_school(Role::Teacher);
        ctx.form_class_ids = vec![Uuid::new_v4()];
        assert_eq!(
            resolve_write_scope(&ctx, Resource::Students),
            Err(ScopeDenied::NotPermitted)
        );
    }

    #[test]
    fn student_sees_only_self() {
        let mut ctx = ctx_with_school(Role::Student);
        ctx.class_id = Some(Uuid::new_v4());
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Students),
            Scope::Rows(vec![ctx.id])
        );
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Grades),
            Scope::Owned(vec![ctx.id])
        );
    }

    #[test]
    fn student_class_scoped_resources() {
        let mut ctx = ctx_with_school(Role::Student);
        let class = Uuid::new_v4();
        ctx.class_id = Some(class);
        for resource in [Resource::Announcements, Resource::Events, Resource::Lessons] {
            assert_eq!(resolve_read_scope(&ctx, resource), Scope::Classes(vec![class]));
        }
    }

    #[test]
    fn parent_scope_derives_from_children() {
        let mut ctx = ctx_with_school(Role::Parent);
        let (s1, s2) = (Uuid::new_v4(), Uuid::new_v4());
        let class = Uuid::new_v4();
        ctx.child_ids = vec![s1, s2];
        ctx.child_class_ids = vec![class];
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Students),
            Scope::Rows(vec![s1, s2])
        );
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Grades),
            Scope::Owned(vec![s1, s2])
        );
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Announcements),
            Scope::Classes(vec![class])
        );
    }

    #[test]
    fn parent_without_children_reads_empty() {
        let ctx = ctx_with_school(Role::Parent);
        assert_eq!(resolve_read_scope(&ctx, Resource::Students), Scope::Empty);
        assert_eq!(resolve_read_scope(&ctx, Resource::Grades), Scope::Empty);
    }

    #[test]
    fn unsupported_role_resource_pairs_are_empty() {
        let ctx = ctx_with_school(Role::Student);
        assert_eq!(
            resolve_read_scope(&ctx, Resource::Administrations),
            Scope::Empty
        );
        assert_eq!(resolve_read_scope(&ctx, Resource::Parents), Scope::Empty);
        let ctx = ctx_with_school(Role::Parent);
        assert_eq!(resolve_read_scope(&ctx, Resource::Teachers), Scope::Empty);
    }

    #[test]
    fn intersect_rows_filters_row_scopes_only() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let scope = Scope::Rows(vec![a, b]);
        assert_eq!(scope.intersect_rows(&[a, c]), vec![a]);
        assert_eq!(Scope::Empty.intersect_rows(&[a, b]), Vec::<Uuid>::new());
        // School scopes pass through; the query applies the filter.
        assert_eq!(
            Scope::Schools(vec![c]).intersect_rows(&[a, b]),
            vec![a, b]
        );
    }

    /// Mutation scope must be a subset of, or equal to, read scope for the
    /// same role and resource.
    #[test]
    fn write_scope_is_subset_of_read_scope() {
        for role in ALL_ROLES {
            let mut ctx = ctx_with_school(role);
            ctx.form_class_ids = vec![Uuid::new_v4()];
            ctx.class_id = Some(Uuid::new_v4());
            ctx.child_ids = vec![Uuid::new_v4()];
            ctx.child_class_ids = vec![Uuid::new_v4()];

            for resource in ALL_RESOURCES {
                let read = resolve_read_scope(&ctx, resource);
                if let Ok(write) = resolve_write_scope(&ctx, resource) {
                    match (&write, &read) {
                        (Scope::Unrestricted, Scope::Unrestricted) => {}
                        (Scope::Schools(w), Scope::Schools(r)) => {
                            assert!(w.iter().all(|id| r.contains(id)), "{role:?} {resource:?}")
                        }
                        (Scope::Owned(w), Scope::Owned(r)) => {
                            assert!(w.iter().all(|id| r.contains(id)), "{role:?} {resource:?}")
                        }
                        (Scope::Empty, _) => {}
                        other => panic!("write scope wider than read scope: {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in ALL_ROLES {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("principal"), None);
    }
}
