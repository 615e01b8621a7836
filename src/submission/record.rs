use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

pub const REQUIRED_FIELDS: [&str; 4] = ["businessName", "contactPerson", "email", "whatsapp"];

/// Sheet header for columns A through K, in row order.
pub const COLUMNS: [&str; 11] = [
    "businessName",
    "contactPerson",
    "email",
    "whatsapp",
    "industry",
    "businessSize",
    "country",
    "challenge",
    "launchFormat",
    "vipPriority",
    "submittedAt",
];

pub const DEFAULT_VIP_PRIORITY: &str = "No";

#[derive(Debug, PartialEq)]
pub enum RecordError {
    MissingRequired(Vec<&'static str>),
    InvalidValue(String),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::MissingRequired(names) => {
                write!(f, "Missing required fields: {}", names.join(", "))
            }
            RecordError::InvalidValue(name) => write!(f, "Invalid value for field: {name}"),
        }
    }
}

/// One form submission, built from the request body and discarded once the
/// row has been sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub business_name: String,
    pub contact_person: String,
    pub email: String,
    pub whatsapp: String,
    pub industry: String,
    pub business_size: String,
    pub country: String,
    pub challenge: String,
    pub launch_format: String,
    pub vip_priority: String,
}

impl SubmissionRecord {
    /// Build a record from a parsed body. Every required field must be
    /// present and non-blank; optional fields fall back to their defaults
    /// when absent or null.
    pub fn from_value(data: &Value) -> Result<Self, RecordError> {
        let empty = Map::new();
        let obj = data.as_object().unwrap_or(&empty);

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|name| {
                is_falsy(obj.get(*name))
                    || !matches!(text_field(obj, name), Ok(Some(v)) if !v.is_empty())
            })
            .collect();

        // Type errors on required fields read as missing to the caller.
        if !missing.is_empty() {
            return Err(RecordError::MissingRequired(missing));
        }

        let required = |name: &str| text_field(obj, name).map(Option::unwrap_or_default);
        let optional = |name: &str, default: &str| {
            text_field(obj, name).map(|v| v.unwrap_or_else(|| default.to_string()))
        };

        Ok(SubmissionRecord {
            business_name: required("businessName")?,
            contact_person: required("contactPerson")?,
            email: required("email")?,
            whatsapp: required("whatsapp")?,
            industry: optional("industry", "")?,
            business_size: optional("businessSize", "")?,
            country: optional("country", "")?,
            challenge: optional("challenge", "")?,
            launch_format: optional("launchFormat", "")?,
            vip_priority: optional("vipPriority", DEFAULT_VIP_PRIORITY)?,
        })
    }

    /// The 11 cells of columns A to K. The timestamp always goes last.
    pub fn to_row(&self, submitted_at: DateTime<Utc>) -> Vec<String> {
        vec![
            self.business_name.clone(),
            self.contact_person.clone(),
            self.email.clone(),
            self.whatsapp.clone(),
            self.industry.clone(),
            self.business_size.clone(),
            self.country.clone(),
            self.challenge.clone(),
            self.launch_format.clone(),
            self.vip_priority.clone(),
            format_timestamp(submitted_at),
        ]
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2026-10-18T09:30:00.123Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `false` and `0` count as an unanswered field, like a blank string.
fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn text_field(obj: &Map<String, Value>, name: &str) -> Result<Option<String>, RecordError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => Err(RecordError::InvalidValue(name.to_string())),
    }
}
