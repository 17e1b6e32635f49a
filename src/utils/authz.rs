//! Write-authorization helpers shared by the resource services.

use serde::Deserialize;
use uuid::Uuid;

use scolara_core::{AppError, CallerContext, Resource, Scope, resolve_write_scope};

/// Resolve the write scope for `(caller, resource)`, mapping a denial to 403
/// with the policy's message.
pub fn require_write_scope(ctx: &CallerContext, resource: Resource) -> Result<Scope, AppError> {
    resolve_write_scope(ctx, resource)
        .map_err(|denied| AppError::forbidden(anyhow::anyhow!(denied.message())))
}

/// Decide which school a create lands in.
///
/// Super callers must name the school explicitly. School-scoped callers may
/// name any school in their association set and default to their primary one;
/// naming a school outside the set is a 403, never a silent redirect.
pub fn resolve_target_school(scope: &Scope, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    match (scope, requested) {
        (Scope::Unrestricted, Some(school_id)) => Ok(school_id),
        (Scope::Unrestricted, None) => Err(AppError::bad_request(anyhow::anyhow!(
            "school_id is required"
        ))),
        (Scope::Schools(ids), Some(school_id)) => {
            if ids.contains(&school_id) {
                Ok(school_id)
            } else {
                Err(AppError::forbidden(anyhow::anyhow!(
                    "Access denied - school is outside your association"
                )))
            }
        }
        (Scope::Schools(ids), None) => ids.first().copied().ok_or_else(|| {
            AppError::forbidden(anyhow::anyhow!(
                "Access denied - no school association found"
            ))
        }),
        _ => Err(AppError::forbidden(anyhow::anyhow!(
            "Access denied - insufficient privileges"
        ))),
    }
}

/// Query parameters of a batch delete.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct BatchDeleteParams {
    /// Comma-separated list of ids to delete.
    pub ids: String,
}

/// Parse the comma-separated `ids` query parameter of a batch delete.
pub fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, AppError> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id = Uuid::parse_str(part)
            .map_err(|_| AppError::bad_request(anyhow::anyhow!("Invalid id in ids parameter")))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "ids parameter must contain at least one id"
        )));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use scolara_core::Role;

    #[test]
    fn test_super_must_name_a_school() {
        let school = Uuid::new_v4();
        assert_eq!(
            resolve_target_school(&Scope::Unrestricted, Some(school)).unwrap(),
            school
        );
        let err = resolve_target_school(&Scope::Unrestricted, None).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_scoped_caller_defaults_to_primary_school() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let scope = Scope::Schools(vec![a, b]);
        assert_eq!(resolve_target_school(&scope, None).unwrap(), a);
        assert_eq!(resolve_target_school(&scope, Some(b)).unwrap(), b);
    }

    #[test]
    fn test_out_of_scope_school_is_forbidden() {
        let scope = Scope::Schools(vec![Uuid::new_v4()]);
        let err = resolve_target_school(&scope, Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_require_write_scope_maps_denials_to_403() {
        let ctx = CallerContext::bare(Uuid::new_v4(), Role::Student);
        let err = require_write_scope(&ctx, Resource::Classes).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let ctx = CallerContext::bare(Uuid::new_v4(), Role::Management);
        let err = require_write_scope(&ctx, Resource::Classes).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(
            err.error.to_string(),
            "Access denied - no school association found"
        );
    }

    #[test]
    fn test_parse_id_list() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = format!("{a},{b} , {a}");
        assert_eq!(parse_id_list(&raw).unwrap(), vec![a, b]);
        assert!(parse_id_list("").is_err());
        assert!(parse_id_list("nope").is_err());
    }
}
