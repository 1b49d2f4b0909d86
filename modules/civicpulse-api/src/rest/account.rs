//! Registration and login. The rest of the API only ever sees the verified
//! user id and role carried by the issued token.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use civicpulse_common::error::FieldError;
use civicpulse_common::{CivicError, Role};
use civicpulse_domains::users::{InsertUser, User};

use crate::error::ApiError;
use crate::password::{hash_password, verify_password};
use crate::AppState;

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}

pub async fn api_register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let mut errors = Vec::new();

    let email = body.email.unwrap_or_default();
    if email.trim().is_empty() || !email.contains('@') {
        errors.push(FieldError::new("email", "valid email required"));
    }
    let username = body.username.unwrap_or_default();
    if username.trim().is_empty() {
        errors.push(FieldError::new("username", "required"));
    }
    let password = body.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("at least {MIN_PASSWORD_CHARS} characters"),
        ));
    }
    if !errors.is_empty() {
        return Err(CivicError::Validation(errors).into());
    }

    let phone_number = body.phone_number.filter(|p| !p.trim().is_empty());
    if User::identifier_taken(&email, &username, phone_number.as_deref(), &state.pool).await? {
        return Err(CivicError::invalid_field(
            "identifier",
            "a user with this email, username, or phone already exists",
        )
        .into());
    }

    let password_hash = hash_password(&password).map_err(CivicError::from)?;
    let user = User::create(
        InsertUser {
            email: &email,
            username: &username,
            phone_number: phone_number.as_deref(),
            password_hash: Some(&password_hash),
            name: body.name.as_deref().unwrap_or("Citizen"),
            role: Role::User,
        },
        &state.pool,
    )
    .await?;

    let token = state
        .jwt
        .create_token(user.id, user.role)
        .map_err(CivicError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user_id: user.id,
            name: user.name,
            role: user.role,
        }),
    ))
}

pub async fn api_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let identifier = body.identifier.unwrap_or_default();
    let password = body.password.unwrap_or_default();
    if identifier.is_empty() || password.is_empty() {
        return Err(CivicError::invalid_field("identifier", "missing credentials").into());
    }

    // One failure shape for unknown user, passwordless account, or bad
    // password; don't reveal which.
    let invalid = || CivicError::Unauthorized("invalid credentials".to_string());

    let user = User::find_by_identifier(&identifier, &state.pool)
        .await?
        .ok_or_else(invalid)?;
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(&password, hash) {
        return Err(invalid().into());
    }

    let token = state
        .jwt
        .create_token(user.id, user.role)
        .map_err(CivicError::from)?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        name: user.name,
        role: user.role,
    }))
}
