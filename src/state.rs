use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::sheets::RowAppender;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    /// Ready appender, or the reason the sheet target failed to load.
    pub sheet: Result<Arc<dyn RowAppender>, String>,
}

impl AppState {
    pub fn appender(&self) -> Result<&dyn RowAppender, AppError> {
        self.sheet
            .as_ref()
            .map(|appender| appender.as_ref())
            .map_err(|message| AppError::Configuration {
                message: message.clone(),
                expose: self.config.expose_error_details,
            })
    }
}
