pub mod auth;
pub mod client;
pub mod credentials;

use async_trait::async_trait;

pub use client::GoogleSheetsClient;

/// First and last column of the submission row (11 cells).
pub const FIRST_COLUMN: &str = "A";
pub const LAST_COLUMN: &str = "K";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppendOutcome {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u64>,
}

#[derive(Debug)]
pub enum SheetsError {
    Credential(String),
    Token(String),
    Http(String),
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl std::fmt::Display for SheetsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsError::Credential(msg) => write!(f, "Credential error: {msg}"),
            SheetsError::Token(msg) => write!(f, "Token exchange failed: {msg}"),
            SheetsError::Http(msg) => write!(f, "Sheets request failed: {msg}"),
            SheetsError::Api {
                status,
                code: Some(code),
                message,
            } => write!(f, "Sheets API error {status} ({code}): {message}"),
            SheetsError::Api {
                status,
                code: None,
                message,
            } => write!(f, "Sheets API error {status}: {message}"),
        }
    }
}

impl std::error::Error for SheetsError {}

/// Destination for submission rows. One call appends exactly one row.
#[async_trait]
pub trait RowAppender: Send + Sync {
    async fn append_row(&self, row: &[String]) -> Result<AppendOutcome, SheetsError>;
}

/// Build the A1 range covering the submission columns of `sheet_name`.
/// Names that are not plain identifiers are quoted, with `'` doubled.
pub fn a1_range(sheet_name: &str) -> String {
    let plain = !sheet_name.is_empty()
        && sheet_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !sheet_name.starts_with(|c: char| c.is_ascii_digit());

    if plain {
        format!("{sheet_name}!{FIRST_COLUMN}:{LAST_COLUMN}")
    } else {
        let escaped = sheet_name.replace('\'', "''");
        format!("'{escaped}'!{FIRST_COLUMN}:{LAST_COLUMN}")
    }
}
