use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::RequireSession;
use crate::export::export_clients_to_csv;
use crate::server::AppState;
use crate::server::response::{PageError, StoreResultExt};

pub async fn export_clients(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, PageError> {
    let clients = state
        .store
        .list_clients_with_specifications()
        .page_err("Failed to list clients")?;

    let path = export_clients_to_csv(&clients, &state.export_dir).map_err(|e| {
        tracing::error!("Failed to export clients: {e}");
        PageError::internal("Failed to write export file")
    })?;

    tracing::info!(path = %path.display(), rows = clients.len(), "Exported clients");

    let page = state.templates.render(
        "export",
        &json!({
            "title": "Export",
            "username": auth.user.username,
            "row_count": clients.len(),
            "path": path.display().to_string(),
        }),
    )?;

    Ok(page.into_response())
}
