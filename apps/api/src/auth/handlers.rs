//! Axum route handlers for registration and sessions.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{AuthError, AuthenticatedUser, NewUser};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub name: String,
    pub session_started_at: DateTime<Utc>,
}

fn validate_registration(request: &RegisterRequest) -> Result<(), AuthError> {
    if request.name.trim().is_empty() {
        return Err(AuthError::Validation("name cannot be empty".to_string()));
    }
    if !request.email.contains('@') {
        return Err(AuthError::Validation("email is not valid".to_string()));
    }
    if request.password.expose_secret().is_empty() {
        return Err(AuthError::Validation("password cannot be empty".to_string()));
    }
    Ok(())
}

/// Runs a password operation on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password task failed: {e}")))?
        .map_err(AppError::from)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    validate_registration(&request)?;

    if state.users.find_by_email(&request.email).await?.is_some() {
        return Err(AuthError::UserExists.into());
    }

    let password = request.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = state
        .users
        .create(NewUser {
            name: request.name,
            email: request.email,
            password_hash,
        })
        .await?;
    info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let stored = user.password_hash.clone();
    let candidate = request.password;
    let verified = blocking(move || verify_password(&stored, &candidate)).await?;
    if !verified {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.sessions.create(&user).await;
    info!(user_id = %user.id, "session started");

    Ok(Json(LoginResponse {
        token,
        name: user.name,
    }))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> StatusCode {
    state.sessions.revoke(user.token).await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/me
pub async fn handle_me(user: AuthenticatedUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        user_id: user.session.user_id,
        name: user.session.name,
        session_started_at: user.session.created_at,
    })
}
