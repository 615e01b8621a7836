use chrono::Utc;
use serde_json::Value;

use crate::error::AppError;
use crate::sheets::RowAppender;

use super::record::{RecordError, SubmissionRecord};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill all required fields";

/// Validate a parsed body and append it as one row. Nothing is sent unless
/// the record is complete, and a failed append is reported, never retried.
pub async fn run(
    appender: &dyn RowAppender,
    raw_data: &Value,
    expose_error_details: bool,
) -> Result<(), AppError> {
    let record = SubmissionRecord::from_value(raw_data).map_err(|e| {
        tracing::debug!("Rejected submission: {e}");
        match e {
            RecordError::MissingRequired(_) => AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()),
            RecordError::InvalidValue(_) => AppError::Validation(e.to_string()),
        }
    })?;

    let row = record.to_row(Utc::now());

    let outcome = appender.append_row(&row).await.map_err(|e| {
        tracing::error!("Google Sheets append error: {e}");
        AppError::Remote {
            message: e.to_string(),
            expose: expose_error_details,
        }
    })?;

    tracing::info!(
        "Appended submission for '{}' to {}",
        record.business_name,
        outcome.updated_range.as_deref().unwrap_or("sheet"),
    );

    Ok(())
}
