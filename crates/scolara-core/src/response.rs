//! Shared response shapes for mutation endpoints.
//!
//! List endpoints return a per-resource `{ data, total }` envelope; batch
//! deletes share the report below, including the ids a guard refused to
//! remove and why.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome of a (batch) delete: how many rows went away, and which requested
/// ids were refused by a guard.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteReport {
    pub deleted: u64,
    pub blocked: Vec<BlockedDelete>,
}

impl DeleteReport {
    pub fn deleted_only(deleted: u64) -> Self {
        Self {
            deleted,
            blocked: Vec::new(),
        }
    }
}

/// A single id a delete guard refused, with a human-readable reason.
#[derive(Debug, Serialize, ToSchema)]
pub struct BlockedDelete {
    pub id: Uuid,
    pub reason: String,
    /// Enrolled student count, for class deletions blocked by enrollment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<i64>,
}

impl BlockedDelete {
    pub fn new(id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
            students: None,
        }
    }

    pub fn with_students(id: Uuid, reason: impl Into<String>, students: i64) -> Self {
        Self {
            id,
            reason: reason.into(),
            students: Some(students),
        }
    }
}
