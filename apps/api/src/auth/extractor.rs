use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use super::sessions::Session;
use crate::errors::AppError;
use crate::state::AppState;

/// A request carrying a live `Authorization: Bearer <token>` session.
/// Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub token: Uuid,
    pub session: Session,
}

fn bearer_token(parts: &Parts) -> Option<Uuid> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let session = state
            .sessions
            .resolve(token)
            .await
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthenticatedUser { token, session })
    }
}
