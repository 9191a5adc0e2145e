use std::sync::Arc;

use axum::http::{HeaderMap, header};
use chrono::Utc;

use super::session::{SESSION_COOKIE, SessionTokenGenerator, parse_session_token};
use crate::server::AppState;
use crate::types::{Session, User};

#[derive(Debug)]
pub enum SessionValidationError {
    MissingCookie,
    InvalidToken,
    SessionExpired,
    InternalError,
}

pub struct ValidatedSession {
    pub session: Session,
    pub user: User,
}

/// Extracts a cookie value from the Cookie header.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with(&format!("{name}=")))?
        .strip_prefix(&format!("{name}="))
        .map(|s| s.to_string())
}

/// Validates the session cookie on a request against the store.
/// Returns the session and its user.
pub fn validate_session(
    state: &Arc<AppState>,
    headers: &HeaderMap,
) -> Result<ValidatedSession, SessionValidationError> {
    let raw_token = extract_cookie(headers, SESSION_COOKIE)
        .ok_or(SessionValidationError::MissingCookie)?;

    let (lookup, _secret) =
        parse_session_token(&raw_token).map_err(|_| SessionValidationError::InvalidToken)?;

    let session = state
        .store
        .get_session_by_lookup(&lookup)
        .map_err(|_| SessionValidationError::InternalError)?
        .ok_or(SessionValidationError::InvalidToken)?;

    let generator = SessionTokenGenerator::new();
    if !generator
        .verify(&raw_token, &session.token_hash)
        .map_err(|_| SessionValidationError::InternalError)?
    {
        return Err(SessionValidationError::InvalidToken);
    }

    if session.expires_at < Utc::now() {
        return Err(SessionValidationError::SessionExpired);
    }

    let user = state
        .store
        .get_user(&session.user_id)
        .map_err(|_| SessionValidationError::InternalError)?
        .ok_or(SessionValidationError::InvalidToken)?;

    if let Err(e) = state.store.update_session_last_used(&session.id) {
        tracing::warn!("Failed to update session last_used_at: {e}");
    }

    Ok(ValidatedSession { session, user })
}

/// Builds the Set-Cookie value for a fresh session.
#[must_use]
pub fn session_cookie(raw_token: &str, max_age_seconds: i64) -> String {
    format!(
        "{SESSION_COOKIE}={raw_token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    )
}

/// Builds the Set-Cookie value that clears the session cookie.
#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
