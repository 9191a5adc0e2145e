use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::response::{PageError, StoreResultExt};

pub async fn list_users(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, PageError> {
    let users = state.store.list_users().page_err("Failed to list users")?;

    let rows: Vec<_> = users
        .iter()
        .map(|u| {
            json!({
                "username": u.username,
                "created_at": u.created_at.format("%Y-%m-%d").to_string(),
            })
        })
        .collect();

    let page = state.templates.render(
        "users",
        &json!({
            "title": "Staff users",
            "username": auth.user.username,
            "users": rows,
        }),
    )?;

    Ok(page.into_response())
}
