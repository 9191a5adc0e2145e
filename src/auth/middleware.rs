use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use super::helpers::validate_session;
use crate::server::AppState;
use crate::types::{Session, User};

/// Extractor for routes that require a signed-in staff user.
///
/// Unauthenticated callers are sent back to the login form rather than
/// shown an error page.
pub struct RequireSession {
    pub session: Session,
    pub user: User,
}

/// Rejection that redirects the browser to `/login`.
#[derive(Debug)]
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSession {
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let validated = validate_session(state, &parts.headers).map_err(|_| AuthRedirect)?;

        Ok(RequireSession {
            session: validated.session,
            user: validated.user,
        })
    }
}
