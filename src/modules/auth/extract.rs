//! Request extractors enforcing the access gate.
//!
//! Routes behind these extractors never run for an unauthorized caller;
//! the handlers themselves perform no authorization logic.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use folio_auth::Session;
use folio_http::AppError;

use crate::state::AppState;

/// Any caller with a valid, unexpired session token.
pub struct AuthSession(pub Session);

/// A caller whose session carries the admin role.
pub struct RequireAdmin(pub Session);

fn bearer_session(parts: &Parts, state: &AppState) -> Result<Session, AppError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("Not authorized, no token provided"))?;

    state
        .sessions
        .verify(token)
        .ok_or_else(|| AppError::unauthorized("Not authorized, token is invalid or expired"))
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_session(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = bearer_session(parts, state)?;
        if !session.role.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(Self(session))
    }
}
