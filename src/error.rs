use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Sheet target could not be loaded at startup.
    Configuration { message: String, expose: bool },
    Validation(String),
    InvalidBody(String),
    MethodNotAllowed,
    PayloadTooLarge,
    /// The append call failed.
    Remote { message: String, expose: bool },
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Configuration { message, .. } => write!(f, "Configuration Error: {message}"),
            AppError::Validation(msg) => write!(f, "Validation Error: {msg}"),
            AppError::InvalidBody(msg) => write!(f, "Invalid Body: {msg}"),
            AppError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            AppError::PayloadTooLarge => write!(f, "Payload Too Large"),
            AppError::Remote { message, .. } => write!(f, "Remote Service Error: {message}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Configuration { message, expose } => {
                tracing::error!("Configuration error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("Server configuration error", expose.then_some(message)),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, error_body(&msg, None)),
            AppError::InvalidBody(msg) => {
                tracing::debug!("Invalid body: {msg}");
                (StatusCode::BAD_REQUEST, error_body("Invalid request body", None))
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                error_body("Method Not Allowed", None),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                error_body("Payload Too Large", None),
            ),
            AppError::Remote { message, expose } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Internal Server Error", expose.then_some(message)),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn error_body(error: &str, details: Option<String>) -> serde_json::Value {
    match details {
        Some(details) => json!({ "error": error, "details": details }),
        None => json!({ "error": error }),
    }
}
