use std::sync::Arc;

use axum::{extract::Multipart, extract::State, response::Json};

use civicpulse_common::CivicError;

use crate::error::ApiError;
use crate::AppState;

/// Accept one multipart file field, store it, and return its public URL.
pub async fn api_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CivicError::invalid_field("file", format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| CivicError::invalid_field("file", format!("failed to read upload: {e}")))?;

        let stored = state.media.put(&file_name, &content_type, &bytes).await?;
        return Ok(Json(serde_json::json!({
            "url": stored.url,
            "type": stored.content_type,
        })));
    }

    Err(CivicError::invalid_field("file", "no file uploaded").into())
}
