mod helpers;
mod middleware;
mod password;
mod session;

pub use helpers::{
    SessionValidationError, ValidatedSession, clear_session_cookie, extract_cookie,
    session_cookie, validate_session,
};
pub use middleware::{AuthRedirect, RequireSession};
pub use password::PasswordHasher;
pub use session::{SESSION_COOKIE, SessionTokenGenerator, parse_session_token};
