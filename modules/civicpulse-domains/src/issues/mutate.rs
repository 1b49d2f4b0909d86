//! Authorized mutation paths: status transition, edit, delete.

use std::str::FromStr;

use sqlx::PgPool;
use uuid::Uuid;

use civicpulse_common::{CivicError, IssueStatus, Result, Role};

use crate::issues::model::Issue;
use crate::issues::validate::{validate_edit, EditIssuePayload};

/// The authenticated caller of a mutation.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Transition an issue to `status`. The raw status string is parsed first
/// (`InvalidStatus`), then the issue is loaded (`NotFound`). The caller must
/// own the issue or hold the admin role.
///
/// Transitions are unordered and idempotent: any state is reachable from any
/// other, and repeating the current status only refreshes `updated_at`.
pub async fn change_status(
    id: Uuid,
    status: &str,
    caller: &Caller,
    pool: &PgPool,
) -> Result<Issue> {
    let status = IssueStatus::from_str(status)?;
    let issue = Issue::find_by_id(id, pool).await?;

    if !issue.can_mutate(caller.id) && !caller.is_admin() {
        return Err(CivicError::Forbidden(
            "only the reporter or an administrator may change the status".to_string(),
        ));
    }

    Issue::set_status(id, status, pool).await
}

/// Overwrite title, description and category of an owned issue. Never touches
/// status, images, or the verdict fields, and never re-runs verification.
pub async fn edit_issue(
    id: Uuid,
    payload: EditIssuePayload,
    caller: &Caller,
    pool: &PgPool,
) -> Result<Issue> {
    let issue = Issue::find_by_id(id, pool).await?;
    if !issue.can_mutate(caller.id) {
        return Err(CivicError::Forbidden(
            "only the reporter may edit this issue".to_string(),
        ));
    }

    let edit = validate_edit(payload)?;
    Issue::update_details(id, &edit.title, &edit.description, &edit.category, pool).await
}

/// Permanently remove an owned issue.
pub async fn delete_issue(id: Uuid, caller: &Caller, pool: &PgPool) -> Result<()> {
    let issue = Issue::find_by_id(id, pool).await?;
    if !issue.can_mutate(caller.id) {
        return Err(CivicError::Forbidden(
            "only the reporter may delete this issue".to_string(),
        ));
    }

    Issue::delete(id, pool).await
}
