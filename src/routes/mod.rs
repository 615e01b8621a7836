pub mod submit;

use axum::routing::post;
use axum::Router;

use crate::state::SharedState;

pub const SUBMIT_PATH: &str = "/api/submit";

pub fn form_routes() -> Router<SharedState> {
    Router::new().route(
        SUBMIT_PATH,
        post(submit::submit)
            .options(submit::preflight)
            .fallback(submit::method_not_allowed),
    )
}
