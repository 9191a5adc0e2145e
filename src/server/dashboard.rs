use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::auth::{RequireSession, validate_session};
use crate::cert::{days_since_grant, is_near_expiry};
use crate::server::AppState;
use crate::server::flash::{clear_flash_cookie, take_flash};
use crate::server::response::{PageError, StoreResultExt};

/// `GET /` routes the browser by session state.
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    match validate_session(&state, &headers) {
        Ok(_) => Redirect::to("/dashboard"),
        Err(_) => Redirect::to("/login"),
    }
}

pub async fn dashboard(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let total_clients = state
        .store
        .count_clients()
        .page_err("Failed to count clients")?;

    let clients = state
        .store
        .list_clients_with_specifications()
        .page_err("Failed to list clients")?;

    let today = Utc::now().date_naive();
    let alert_clients: Vec<_> = clients
        .iter()
        .filter_map(|row| {
            let grant_date = row.client.grant_date?;
            if !is_near_expiry(grant_date, today) {
                return None;
            }
            Some(json!({
                "company_name": row.client.company_name,
                "specification_name": row.specification_name,
                "certificate_number": row.client.certificate_number,
                "grant_date": grant_date.format("%Y-%m-%d").to_string(),
                "days_since_grant": days_since_grant(grant_date, today),
            }))
        })
        .collect();

    let page = state.templates.render(
        "dashboard",
        &json!({
            "title": "Dashboard",
            "username": auth.user.username,
            "flash": take_flash(&headers),
            "total_clients": total_clients,
            "alert_clients": alert_clients,
        }),
    )?;

    Ok(([(SET_COOKIE, clear_flash_cookie())], page).into_response())
}
