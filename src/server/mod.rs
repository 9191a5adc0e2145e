mod auth_pages;
mod clients;
mod dashboard;
mod export_page;
pub mod flash;
pub mod forms;
pub mod response;
mod router;
mod users;
pub mod validation;
pub mod views;

pub use router::{AppState, create_router};
