pub mod config;
pub mod error;
pub mod state;
pub mod routes;
pub mod sheets;
pub mod submission;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::sheets::{GoogleSheetsClient, RowAppender};
use crate::state::{AppState, SharedState};

/// Build the application with the Google Sheets client described by
/// `config.sheet`. A broken sheet target is logged here and reported to
/// callers as a configuration error.
pub fn build_app(config: Config) -> Router {
    let sheet = match &config.sheet {
        Ok(target) => match GoogleSheetsClient::new(target) {
            Ok(client) => {
                tracing::info!(
                    "Appending submissions to spreadsheet {} as {}",
                    target.spreadsheet_id,
                    target.service_account.client_email
                );
                Ok(Arc::new(client) as Arc<dyn RowAppender>)
            }
            Err(e) => Err(e.to_string()),
        },
        Err(e) => Err(e.clone()),
    };

    if let Err(e) = &sheet {
        tracing::error!("Sheet target not available, submissions will be rejected: {e}");
    }

    build_app_with(config, sheet)
}

/// Build the application around an existing appender (or the reason there
/// is none).
pub fn build_app_with(config: Config, sheet: Result<Arc<dyn RowAppender>, String>) -> Router {
    let allow_origin = HeaderValue::from_str(&config.allow_origin).unwrap_or_else(|_| {
        tracing::warn!(
            "Invalid SHEETFORM_ALLOW_ORIGIN '{}', falling back to '*'",
            config.allow_origin
        );
        HeaderValue::from_static("*")
    });

    let state: SharedState = Arc::new(AppState { config, sheet });

    Router::new()
        .merge(routes::form_routes())
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("access-control-allow-origin"),
            allow_origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("access-control-allow-methods"),
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("access-control-allow-headers"),
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
