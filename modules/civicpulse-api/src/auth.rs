//! Bearer-token extractors supplying the verified caller identity.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use civicpulse_common::{CivicError, Role};
use civicpulse_domains::issues::Caller;

use crate::error::ApiError;
use crate::AppState;

/// A caller with a valid bearer token. Extraction fails with 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller {
            id: self.id,
            role: self.role,
        }
    }
}

/// Optional identity: `None` when no Authorization header is present. A
/// present-but-invalid token is still rejected with 401 rather than silently
/// downgraded to anonymous.
pub struct OptionalAuthUser(pub Option<AuthUser>);

fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim)
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, CivicError> {
    let Some(header) = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(None);
    };

    let token = bearer_token(header)
        .ok_or_else(|| CivicError::Unauthorized("malformed Authorization header".to_string()))?;

    let claims = state
        .jwt
        .verify_token(token)
        .map_err(|_| CivicError::Unauthorized("invalid or expired token".to_string()))?;

    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| CivicError::Unauthorized("invalid token subject".to_string()))?;

    Ok(Some(AuthUser {
        id,
        role: claims.role,
    }))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state)? {
            Some(user) => Ok(user),
            None => Err(CivicError::Unauthorized("missing bearer token".to_string()).into()),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_scheme() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer   spaced  "), Some("spaced"));
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("bearer abc"), None);
    }
}
