//! One-shot flash messages carried in a short-lived cookie.
//!
//! Redirecting handlers set the cookie; the next rendered page reads it
//! and clears it. Values are base64-encoded so arbitrary text survives
//! cookie-value restrictions.

use axum::http::HeaderMap;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::auth::extract_cookie;

const FLASH_COOKIE: &str = "certdesk_flash";

/// Set-Cookie value carrying a flash message to the next page load.
#[must_use]
pub fn flash_cookie(message: &str) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(message.as_bytes());
    format!("{FLASH_COOKIE}={encoded}; Path=/; HttpOnly; SameSite=Lax; Max-Age=60")
}

/// Set-Cookie value that clears the flash cookie.
#[must_use]
pub fn clear_flash_cookie() -> String {
    format!("{FLASH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Reads the flash message from the request, if any. The caller is
/// responsible for also sending `clear_flash_cookie` so the message
/// shows only once.
#[must_use]
pub fn take_flash(headers: &HeaderMap) -> Option<String> {
    let raw = extract_cookie(headers, FLASH_COOKIE)?;
    if raw.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(raw.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}
