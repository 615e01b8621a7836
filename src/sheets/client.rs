use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use super::auth::TokenProvider;
use super::{a1_range, AppendOutcome, RowAppender, SheetsError};
use crate::config::SheetTarget;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_range: Option<String>,
    updated_rows: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Appends rows through `spreadsheets.values.append` with RAW input.
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    tokens: TokenProvider,
    append_url: Url,
}

impl GoogleSheetsClient {
    pub fn new(target: &SheetTarget) -> Result<Self, SheetsError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SheetsError::Http(format!("Failed to build HTTP client: {e}")))?;

        let tokens = TokenProvider::new(client.clone(), &target.service_account)?;
        let append_url = build_append_url(&target.api_url, &target.spreadsheet_id, &target.sheet_name)?;

        Ok(Self {
            client,
            tokens,
            append_url,
        })
    }

    pub fn append_url(&self) -> &Url {
        &self.append_url
    }
}

/// `{api}/v4/spreadsheets/{id}/values/{range}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS`
pub fn build_append_url(api_url: &str, spreadsheet_id: &str, sheet_name: &str) -> Result<Url, SheetsError> {
    let mut url = Url::parse(api_url)
        .map_err(|e| SheetsError::Http(format!("Invalid Sheets API URL '{api_url}': {e}")))?;

    let range_segment = format!("{}:append", a1_range(sheet_name));
    url.path_segments_mut()
        .map_err(|_| SheetsError::Http(format!("Sheets API URL cannot be a base: {api_url}")))?
        .pop_if_empty()
        .extend([
            "v4",
            "spreadsheets",
            spreadsheet_id,
            "values",
            range_segment.as_str(),
        ]);

    url.query_pairs_mut()
        .append_pair("valueInputOption", "RAW")
        .append_pair("insertDataOption", "INSERT_ROWS");

    Ok(url)
}

#[async_trait]
impl RowAppender for GoogleSheetsClient {
    async fn append_row(&self, row: &[String]) -> Result<AppendOutcome, SheetsError> {
        let token = self.tokens.access_token().await?;

        let resp = self
            .client
            .post(self.append_url.clone())
            .bearer_auth(token)
            .json(&json!({
                "majorDimension": "ROWS",
                "values": [row],
            }))
            .send()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SheetsError::Http(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => SheetsError::Api {
                    status: status.as_u16(),
                    code: envelope.error.status,
                    message: envelope.error.message,
                },
                Err(_) => SheetsError::Api {
                    status: status.as_u16(),
                    code: None,
                    message: body.chars().take(512).collect(),
                },
            });
        }

        // A 2xx with an unexpected body still means the row went in.
        let outcome = serde_json::from_str::<AppendResponse>(&body)
            .ok()
            .and_then(|r| r.updates)
            .map(|u| AppendOutcome {
                updated_range: u.updated_range,
                updated_rows: u.updated_rows,
            })
            .unwrap_or_default();

        Ok(outcome)
    }
}
