//! Error types for Curio
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Access denied (403)
    #[error("Access denied")]
    Forbidden,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// OAuth login failure (401)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client error (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Render the generic HTML error page
///
/// Browsing routes respond with HTML, so resource and validation
/// errors surface as an error page rather than a JSON body.
fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Error - Curio</title></head>\n\
         <body>\n<h1>Error</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to catalog</a></p>\n\
         </body>\n</html>",
        html_escape::encode_text(message)
    );
    (status, Html(body)).into_response()
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Browsing/mutation errors render the HTML error page; the
    /// login endpoints speak JSON, so auth failures use a JSON body.
    fn into_response(self) -> Response {
        use axum::Json;

        match &self {
            AppError::NotFound => error_page(
                StatusCode::NOT_FOUND,
                "404 What you were looking for is just not there.",
            ),
            AppError::Validation(msg) => error_page(StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden => error_page(StatusCode::FORBIDDEN, "Access denied."),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Authentication required"})),
            )
                .into_response(),
            AppError::Auth(msg) => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": msg})),
            )
                .into_response(),
            AppError::HttpClient(error) => {
                tracing::error!(%error, "Upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(serde_json::json!({"error": "Upstream request failed"})),
                )
                    .into_response()
            }
            AppError::Database(error) => {
                tracing::error!(%error, "Database error");
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Oops... Something went wrong. Please try again.",
                )
            }
            AppError::Config(msg) => {
                tracing::error!(message = %msg, "Configuration error");
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Oops... Something went wrong. Please try again.",
                )
            }
            AppError::Internal(error) => {
                tracing::error!(%error, "Internal error");
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Oops... Something went wrong. Please try again.",
                )
            }
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
