use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};

use civicpulse_domains::issues::{submit_issue, NewIssuePayload, SubmittedIssue};

use crate::auth::OptionalAuthUser;
use crate::error::ApiError;
use crate::AppState;

/// Submit a new issue. Unauthenticated submissions are attributed to the
/// well-known anonymous reporter; a present-but-invalid token is rejected by
/// the extractor before the pipeline runs.
pub async fn api_submit_issue(
    State(state): State<Arc<AppState>>,
    user: OptionalAuthUser,
    Json(payload): Json<NewIssuePayload>,
) -> Result<(StatusCode, Json<SubmittedIssue>), ApiError> {
    let submitted = submit_issue(
        payload,
        user.0.map(|u| u.id),
        &state.verifier,
        &state.anonymous,
        &state.pool,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(submitted)))
}
