//! # Certdesk
//!
//! A client-certification registry server, usable both as a standalone
//! binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! certdesk = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use certdesk::notify::LogNotifier;
//! use certdesk::server::{AppState, create_router};
//! use certdesk::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/certdesk.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     PathBuf::from("./data/exports"),
//!     Arc::new(LogNotifier::new(None)),
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the admin/serve binary. Disable with
//!   `default-features = false`.

pub mod auth;
pub mod cert;
pub mod config;
pub mod error;
pub mod export;
pub mod notify;
pub mod server;
pub mod store;
pub mod types;
