//! Scoping-policy properties checked end to end through the public API of
//! the core crate: empty associations never widen access, write scope stays
//! inside read scope, and deletes can only ever touch rows the caller reads.

use uuid::Uuid;

use scolara_core::{
    CallerContext, Resource, Role, Scope, ScopeDenied, resolve_read_scope, resolve_write_scope,
};

fn ctx(role: Role) -> CallerContext {
    CallerContext::bare(Uuid::new_v4(), role)
}

fn ctx_with_school(role: Role) -> CallerContext {
    let mut ctx = ctx(role);
    ctx.school_ids = vec![Uuid::new_v4()];
    ctx
}

#[test]
fn test_management_without_school_lists_nothing_everywhere() {
    let ctx = ctx(Role::Management);
    for resource in [
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
    ] {
        let scope = resolve_read_scope(&ctx, resource);
        assert!(scope.is_empty(), "{resource:?} should be empty");
    }
}

#[test]
fn test_management_without_school_write_is_denied_with_message() {
    let ctx = ctx(Role::Management);
    let denied = resolve_write_scope(&ctx, Resource::Classes).unwrap_err();
    assert_eq!(denied, ScopeDenied::NoSchool);
    assert_eq!(
        denied.message(),
        "Access denied - no school association found"
    );
}

#[test]
fn test_teacher_cannot_create_students() {
    let mut ctx = ctx_with_school(Role::Teacher);
    ctx.form_class_ids = vec![Uuid::new_v4()];
    assert_eq!(
        resolve_write_scope(&ctx, Resource::Students),
        Err(ScopeDenied::NotPermitted)
    );
}

#[test]
fn test_student_and_parent_are_read_only() {
    for role in [Role::Student, Role::Parent] {
        let mut ctx = ctx_with_school(role);
        ctx.class_id = Some(Uuid::new_v4());
        ctx.child_ids = vec![Uuid::new_v4()];
        for resource in [
            Resource::Students,
            Resource::Classes,
            Resource::Grades,
            Resource::Announcements,
            Resource::Events,
        ] {
            assert!(
                resolve_write_scope(&ctx, resource).is_err(),
                "{role:?} must not write {resource:?}"
            );
        }
    }
}

#[test]
fn test_multi_school_write_validates_target_membership() {
    let mut ctx = ctx(Role::Management);
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    ctx.school_ids = vec![a, b];

    let scope = resolve_write_scope(&ctx, Resource::Teachers).unwrap();
    assert!(scope.allows_school(a));
    assert!(scope.allows_school(b));
    assert!(!scope.allows_school(Uuid::new_v4()));
}

#[test]
fn test_deleted_ids_are_subset_of_scope() {
    let (mine, theirs) = (Uuid::new_v4(), Uuid::new_v4());
    let scope = Scope::Rows(vec![mine]);

    let allowed = scope.intersect_rows(&[mine, theirs]);
    assert_eq!(allowed, vec![mine]);

    assert!(Scope::Empty.intersect_rows(&[mine, theirs]).is_empty());
}

#[test]
fn test_parent_scope_tracks_children_not_school() {
    let mut ctx = ctx_with_school(Role::Parent);
    let child = Uuid::new_v4();
    ctx.child_ids = vec![child];

    assert_eq!(
        resolve_read_scope(&ctx, Resource::Students),
        Scope::Rows(vec![child])
    );
    // Removing the children empties the scope even with a school attached.
    ctx.child_ids.clear();
    assert!(resolve_read_scope(&ctx, Resource::Students).is_empty());
}

#[test]
fn test_super_needs_no_associations() {
    let ctx = ctx(Role::Super);
    assert_eq!(
        resolve_read_scope(&ctx, Resource::Grades),
        Scope::Unrestricted
    );
    assert_eq!(
        resolve_write_scope(&ctx, Resource::Schools),
        Ok(Scope::Unrestricted)
    );
}
