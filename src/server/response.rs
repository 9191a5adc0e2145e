use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::Result as StoreResult;

/// Page-level error that converts to a plain HTML error response.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub message: String,
}

impl PageError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let body = format!(
            "<!DOCTYPE html>\n<html><head><title>certdesk</title></head>\
             <body><h1>{}</h1><p>{}</p><p><a href=\"/dashboard\">Back</a></p></body></html>",
            self.status, self.message
        );
        (self.status, Html(body)).into_response()
    }
}

/// Extension trait for converting store results to page errors with a custom message.
pub trait StoreResultExt<T> {
    fn page_err(self, message: &'static str) -> Result<T, PageError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn page_err(self, message: &'static str) -> Result<T, PageError> {
        self.map_err(|_| PageError::internal(message))
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, PageError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, PageError> {
        self.ok_or_else(|| PageError::not_found(message))
    }
}
