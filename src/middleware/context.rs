//! Per-request caller context loading.
//!
//! The scope calculator in `scolara-core` is pure; this module performs the
//! one lookup it needs — the caller's school associations and, depending on
//! role, their form-master classes or children. The context is built fresh
//! for every request and discarded afterwards; nothing is cached.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, CallerContext, Role};

use crate::middleware::auth::AuthUser;

/// Load the caller's [`CallerContext`] from their session claims.
///
/// A missing principal record is not an error here: the context simply ends
/// up with no school association, which reads turn into empty results and
/// writes turn into 403.
#[instrument(skip(db, auth_user))]
pub async fn load_caller_context(
    db: &PgPool,
    auth_user: &AuthUser,
) -> Result<CallerContext, AppError> {
    let id = auth_user.user_id()?;
    let role = auth_user.role()?;
    let mut ctx = CallerContext::bare(id, role);

    match role {
        Role::Super => {}

        Role::Management | Role::Admin => {
            let primary: Option<Option<Uuid>> =
                sqlx::query_scalar("SELECT school_id FROM administrations WHERE id = $1")
                    .bind(id)
                    .fetch_optional(db)
                    .await?;
            if let Some(Some(school_id)) = primary {
                ctx.school_ids.push(school_id);
            }

            // Multi-school callers carry extra association rows.
            let extra: Vec<Uuid> = sqlx::query_scalar(
                "SELECT school_id FROM administration_schools WHERE administration_id = $1",
            )
            .bind(id)
            .fetch_all(db)
            .await?;
            for school_id in extra {
                if !ctx.school_ids.contains(&school_id) {
                    ctx.school_ids.push(school_id);
                }
            }
        }

        Role::Teacher => {
            let school: Option<Uuid> =
                sqlx::query_scalar("SELECT school_id FROM teachers WHERE id = $1")
                    .bind(id)
                    .fetch_optional(db)
                    .await?;
            if let Some(school_id) = school {
                ctx.school_ids.push(school_id);
            }

            ctx.form_class_ids =
                sqlx::query_scalar("SELECT id FROM classes WHERE form_master_id = $1")
                    .bind(id)
                    .fetch_all(db)
                    .await?;
        }

        Role::Student => {
            let row: Option<(Uuid, Option<Uuid>)> = sqlx::query_as(
                "SELECT school_id, class_id FROM students WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(db)
            .await?;
            if let Some((school_id, class_id)) = row {
                ctx.school_ids.push(school_id);
                ctx.class_id = class_id;
            }
        }

        Role::Parent => {
            let school: Option<Uuid> =
                sqlx::query_scalar("SELECT school_id FROM parents WHERE id = $1")
                    .bind(id)
                    .fetch_optional(db)
                    .await?;
            if let Some(school_id) = school {
                ctx.school_ids.push(school_id);
            }

            let children: Vec<(Uuid, Option<Uuid>)> =
                sqlx::query_as("SELECT id, class_id FROM students WHERE parent_id = $1")
                    .bind(id)
                    .fetch_all(db)
                    .await?;
            for (child_id, class_id) in children {
                ctx.child_ids.push(child_id);
                if let Some(class_id) = class_id {
                    if !ctx.child_class_ids.contains(&class_id) {
                        ctx.child_class_ids.push(class_id);
                    }
                }
            }
        }
    }

    Ok(ctx)
}
