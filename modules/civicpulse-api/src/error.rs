use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use civicpulse_common::CivicError;

/// Wrapper mapping the domain error taxonomy onto HTTP responses. Internal
/// failures are logged, never leaked.
pub struct ApiError(CivicError);

impl From<CivicError> for ApiError {
    fn from(err: CivicError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            CivicError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({"error": "Validation failed", "details": errors}),
            ),
            CivicError::InvalidStatus(_) | CivicError::InvalidGeometry(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({"error": self.0.to_string()}),
            ),
            CivicError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({"error": self.0.to_string()}),
            ),
            CivicError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                serde_json::json!({"error": self.0.to_string()}),
            ),
            CivicError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({"error": self.0.to_string()}),
            ),
            CivicError::SubmissionFailed(_) | CivicError::Database(_) | CivicError::Anyhow(_) => {
                error!(error = ?self.0, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({"error": "Internal server error"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicpulse_common::error::FieldError;

    fn status_of(err: CivicError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_http_statuses() {
        assert_eq!(
            status_of(CivicError::Validation(vec![FieldError::new("title", "required")])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CivicError::InvalidStatus("DONE".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CivicError::InvalidGeometry("nan".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CivicError::Unauthorized("no token".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CivicError::Forbidden("not yours".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(CivicError::NotFound("issue x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CivicError::Anyhow(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
