use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde_json::json;

use crate::auth::RequireSession;
use crate::error::Error;
use crate::notify::Notifier;
use crate::server::AppState;
use crate::server::flash::{clear_flash_cookie, flash_cookie, take_flash};
use crate::server::forms::ClientForm;
use crate::server::response::{PageError, StoreResultExt};
use crate::server::validation::{validate_company_name, validate_email};
use crate::types::NewClient;

pub async fn list_clients(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let clients = state
        .store
        .list_clients_with_specifications()
        .page_err("Failed to list clients")?;

    let rows: Vec<_> = clients
        .iter()
        .map(|row| {
            json!({
                "company_name": row.client.company_name,
                "email": row.client.email,
                "specification_name": row.specification_name,
                "certificate_number": row.client.certificate_number,
                "grant_date": row
                    .client
                    .grant_date
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            })
        })
        .collect();

    let page = state.templates.render(
        "clients",
        &json!({
            "title": "Clients",
            "username": auth.user.username,
            "flash": take_flash(&headers),
            "clients": rows,
        }),
    )?;

    Ok(([(SET_COOKIE, clear_flash_cookie())], page).into_response())
}

fn render_client_form(
    state: &Arc<AppState>,
    username: &str,
    error: Option<&str>,
    company_name: &str,
    email: &str,
) -> Result<Response, PageError> {
    let specs = state
        .store
        .list_specifications()
        .page_err("Failed to list specifications")?;

    let spec_rows: Vec<_> = specs
        .iter()
        .map(|s| json!({ "id": s.id, "name": s.name }))
        .collect();

    let page = state.templates.render(
        "client_form",
        &json!({
            "title": "New client",
            "username": username,
            "error": error,
            "specifications": spec_rows,
            "company_name": company_name,
            "email": email,
        }),
    )?;

    Ok(page.into_response())
}

pub async fn client_form(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, PageError> {
    render_client_form(&state, &auth.user.username, None, "", "")
}

pub async fn create_client(
    auth: RequireSession,
    State(state): State<Arc<AppState>>,
    Form(form): Form<ClientForm>,
) -> Result<Response, PageError> {
    let username = &auth.user.username;

    if let Err(message) = validate_company_name(&form.company_name)
        .and_then(|()| validate_email(&form.email))
    {
        return render_client_form(
            &state,
            username,
            Some(&message),
            &form.company_name,
            &form.email,
        );
    }

    let grant_date = match form.grant_date.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                return render_client_form(
                    &state,
                    username,
                    Some("Grant date must be in YYYY-MM-DD format"),
                    &form.company_name,
                    &form.email,
                );
            }
        },
        None => None,
    };

    // The referenced specification must exist before issuing; the
    // transaction in create_client re-checks under the lock.
    let spec = state
        .store
        .get_specification(&form.specification_id)
        .page_err("Failed to look up specification")?;

    if spec.is_none() {
        return render_client_form(
            &state,
            username,
            Some("Selected specification does not exist"),
            &form.company_name,
            &form.email,
        );
    }

    let new = NewClient {
        company_name: form.company_name.trim().to_string(),
        email: form.email.trim().to_string(),
        specification_id: form.specification_id.clone(),
        grant_date,
    };

    let client = match state.store.create_client(&new) {
        Ok(client) => client,
        Err(Error::NotFound) => {
            return render_client_form(
                &state,
                username,
                Some("Selected specification does not exist"),
                &form.company_name,
                &form.email,
            );
        }
        Err(e) => {
            tracing::error!("Failed to create client: {e}");
            return Err(PageError::internal("Failed to save client"));
        }
    };

    if let Err(e) = state.notifier.notify(
        &client.email,
        "Certificate issued",
        &format!(
            "{} has been issued certificate number {}.",
            client.company_name, client.certificate_number
        ),
    ) {
        tracing::warn!("Failed to send notification: {e}");
    }

    tracing::info!(
        company = %client.company_name,
        certificate_number = client.certificate_number,
        "Client created"
    );

    Ok((
        [(
            SET_COOKIE,
            flash_cookie(&format!(
                "Client saved: certificate number {} issued",
                client.certificate_number
            )),
        )],
        Redirect::to("/clients"),
    )
        .into_response())
}
