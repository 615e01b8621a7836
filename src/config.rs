use std::net::IpAddr;

use crate::sheets::credentials::ServiceAccountKey;

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub allow_origin: String,
    pub max_body_size: usize,
    pub expose_error_details: bool,
    pub log_level: String,
    /// Sheet target settings. A broken target does not stop the server; the
    /// submit endpoint answers with a configuration error instead.
    pub sheet: Result<SheetTarget, String>,
}

#[derive(Debug, Clone)]
pub struct SheetTarget {
    pub service_account: ServiceAccountKey,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("SHEETFORM_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid SHEETFORM_HOST: {e}"))?;

        let port: u16 = env_or("SHEETFORM_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid SHEETFORM_PORT: {e}"))?;

        let allow_origin = env_or("SHEETFORM_ALLOW_ORIGIN", "*");

        let max_body_size: usize = env_or("SHEETFORM_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid SHEETFORM_MAX_BODY_SIZE: {e}"))?;

        let expose_error_details = parse_bool(&env_or("SHEETFORM_EXPOSE_ERROR_DETAILS", "false"))
            .ok_or_else(|| "Invalid SHEETFORM_EXPOSE_ERROR_DETAILS: expected true or false".to_string())?;

        let log_level = env_or("SHEETFORM_LOG_LEVEL", "info");

        Ok(Config {
            host,
            port,
            allow_origin,
            max_body_size,
            expose_error_details,
            log_level,
            sheet: SheetTarget::from_env(),
        })
    }
}

impl SheetTarget {
    pub fn from_env() -> Result<Self, String> {
        let raw_key = env_required("SERVICE_ACCOUNT_JSON")?;
        let service_account = ServiceAccountKey::from_json(&raw_key)
            .map_err(|e| format!("Invalid SERVICE_ACCOUNT_JSON: {e}"))?;

        let spreadsheet_id = env_required("SPREADSHEET_ID")?;

        let sheet_name = env_or("SHEET_NAME", "Sheet1");
        if sheet_name.trim().is_empty() {
            return Err("SHEET_NAME must not be empty".to_string());
        }

        let api_url = env_or("SHEETS_API_URL", DEFAULT_SHEETS_API_URL);

        Ok(SheetTarget {
            service_account,
            spreadsheet_id,
            sheet_name,
            api_url,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
