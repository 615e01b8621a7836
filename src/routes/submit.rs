use axum::body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::{parser, pipeline};

pub const SUCCESS_MESSAGE: &str = "Form submitted successfully";

pub async fn submit(
    State(state): State<SharedState>,
    request: Request,
) -> Result<Response, AppError> {
    // Configuration is checked before the body is looked at.
    let appender = state.appender()?;

    let (parts, body) = request.into_parts();
    let limit = state.config.max_body_size;
    if declared_length(&parts.headers).is_some_and(|len| len > limit) {
        return Err(AppError::PayloadTooLarge);
    }

    // A read error here is almost always the limit tripping on a chunked body.
    let bytes = body::to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!("Failed to read body: {e}");
        AppError::PayloadTooLarge
    })?;

    let raw_data = parser::parse(&parts.headers, bytes)
        .await
        .map_err(AppError::InvalidBody)?;

    pipeline::run(appender, &raw_data, state.config.expose_error_details).await?;

    Ok((StatusCode::OK, Json(json!({ "message": SUCCESS_MESSAGE }))).into_response())
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// CORS preflight. The allow-* headers are added for every response by the
/// router, so only the cache lifetime is set here.
pub async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [("Access-Control-Max-Age", "86400")],
    )
        .into_response()
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
