use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::views::Templates;
use crate::auth::PasswordHasher;
use crate::notify::Notifier;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub templates: Templates,
    pub password_hasher: PasswordHasher,
    pub notifier: Arc<dyn Notifier>,
    /// Directory that receives spreadsheet exports.
    pub export_dir: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, export_dir: PathBuf, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            templates: Templates::new(),
            password_hasher: PasswordHasher::new(),
            notifier,
            export_dir,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(super::dashboard::index))
        .route(
            "/login",
            get(super::auth_pages::login_form).post(super::auth_pages::login_submit),
        )
        .route("/logout", get(super::auth_pages::logout))
        .route("/dashboard", get(super::dashboard::dashboard))
        .route("/users", get(super::users::list_users))
        .route(
            "/change_password",
            get(super::auth_pages::change_password_form)
                .post(super::auth_pages::change_password_submit),
        )
        .route("/clients", get(super::clients::list_clients))
        .route(
            "/client_form",
            get(super::clients::client_form).post(super::clients::create_client),
        )
        .route("/export_clients", get(super::export_page::export_clients))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
