pub mod account;
pub mod submit;
pub mod upload;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use civicpulse_domains::issues::{
    change_status, delete_issue, edit_issue, EditIssuePayload, Issue,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

// --- Query structs ---

#[derive(Deserialize)]
pub struct ListQuery {
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    status: String,
}

// --- Handlers ---

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}

/// All issues, newest first.
pub async fn api_issues(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let issues = Issue::list(params.limit, &state.pool).await?;
    Ok(Json(issues))
}

pub async fn api_issue_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Issue>, ApiError> {
    let issue = Issue::find_by_id(id, &state.pool).await?;
    Ok(Json(issue))
}

pub async fn api_user_issues(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let issues = Issue::list_by_reporter(user_id, &state.pool).await?;
    Ok(Json(issues))
}

pub async fn api_change_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(body): Json<StatusBody>,
) -> Result<Json<Issue>, ApiError> {
    let issue = change_status(id, &body.status, &user.caller(), &state.pool).await?;
    Ok(Json(issue))
}

pub async fn api_edit_issue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<EditIssuePayload>,
) -> Result<Json<Issue>, ApiError> {
    let issue = edit_issue(id, payload, &user.caller(), &state.pool).await?;
    Ok(Json(issue))
}

pub async fn api_delete_issue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    delete_issue(id, &user.caller(), &state.pool).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Issue deleted",
    })))
}
