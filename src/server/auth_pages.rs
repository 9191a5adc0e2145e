use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{
    RequireSession, SessionTokenGenerator, clear_session_cookie, session_cookie,
};
use crate::error::Error;
use crate::server::AppState;
use crate::server::flash::{clear_flash_cookie, flash_cookie, take_flash};
use crate::server::forms::{ChangePasswordForm, LoginForm};
use crate::server::response::{PageError, StoreResultExt};
use crate::server::validation::validate_password;
use crate::types::Session;

const SESSION_TTL_DAYS: i64 = 30;

fn render_login(
    state: &Arc<AppState>,
    error: Option<&str>,
    flash: Option<String>,
) -> Result<Response, PageError> {
    let page = state.templates.render(
        "login",
        &json!({
            "title": "Sign in",
            "error": error,
            "flash": flash,
        }),
    )?;

    Ok(([(SET_COOKIE, clear_flash_cookie())], page).into_response())
}

pub async fn login_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    render_login(&state, None, take_flash(&headers))
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let user = state
        .store
        .get_user_by_username(&form.username)
        .page_err("Failed to look up user")?;

    let verified = match &user {
        Some(user) => state
            .password_hasher
            .verify(&form.password, &user.password_hash)
            .page_err("Failed to verify password")?,
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        tracing::info!(username = %form.username, "Failed login attempt");
        return render_login(&state, Some("Invalid username or password"), None);
    };

    let raw_token = start_session(&state, &user.id)?;

    tracing::info!(username = %user.username, "User signed in");

    Ok((
        [(
            SET_COOKIE,
            session_cookie(&raw_token, SESSION_TTL_DAYS * 24 * 60 * 60),
        )],
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// Creates a session row for the user and returns the raw cookie token.
fn start_session(state: &Arc<AppState>, user_id: &str) -> Result<String, PageError> {
    let generator = SessionTokenGenerator::new();

    const MAX_RETRIES: u32 = 3;
    for _ in 0..MAX_RETRIES {
        let (raw_token, lookup, hash) = generator
            .generate()
            .map_err(|_| PageError::internal("Failed to generate session token"))?;

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            token_hash: hash,
            token_lookup: lookup,
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            last_used_at: None,
        };

        match state.store.create_session(&session) {
            Ok(()) => return Ok(raw_token),
            Err(Error::AlreadyExists) => continue,
            Err(_) => return Err(PageError::internal("Failed to create session")),
        }
    }

    Err(PageError::internal("Failed to create session after retries"))
}

pub async fn logout(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, PageError> {
    state
        .store
        .delete_session(&auth.session.id)
        .page_err("Failed to delete session")?;

    // Opportunistic sweep of anything past its expiry
    if let Err(e) = state.store.delete_expired_sessions() {
        tracing::warn!("Failed to sweep expired sessions: {e}");
    }

    Ok((
        [(SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response())
}

pub async fn change_password_form(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, PageError> {
    let page = state.templates.render(
        "change_password",
        &json!({
            "title": "Change password",
            "username": auth.user.username,
        }),
    )?;

    Ok(page.into_response())
}

pub async fn change_password_submit(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Response, PageError> {
    if let Err(message) = validate_password(&form.new_password) {
        let page = state.templates.render(
            "change_password",
            &json!({
                "title": "Change password",
                "username": auth.user.username,
                "error": message,
            }),
        )?;
        return Ok(page.into_response());
    }

    let hash = state
        .password_hasher
        .hash(&form.new_password)
        .map_err(|_| PageError::internal("Failed to hash password"))?;

    state
        .store
        .update_user_password(&auth.user.id, &hash)
        .page_err("Failed to update password")?;

    tracing::info!(username = %auth.user.username, "Password changed");

    Ok((
        [(SET_COOKIE, flash_cookie("Password updated"))],
        Redirect::to("/dashboard"),
    )
        .into_response())
}
