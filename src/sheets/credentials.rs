use jsonwebtoken::EncodingKey;
use serde::Deserialize;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google service-account key, as found in the JSON key file downloaded from
/// the Cloud console. Only the fields needed for the JWT-bearer grant are kept.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse and check a key. The private key is decoded here so a bad PEM
    /// shows up at startup rather than on the first submission.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let key: ServiceAccountKey =
            serde_json::from_str(raw).map_err(|e| format!("not a service account key: {e}"))?;

        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(format!("unexpected credential type '{kind}'"));
            }
        }

        if key.client_email.trim().is_empty() {
            return Err("client_email is empty".to_string());
        }

        if key.token_uri.trim().is_empty() {
            return Err("token_uri is empty".to_string());
        }

        key.encoding_key()?;

        Ok(key)
    }

    pub fn encoding_key(&self) -> Result<EncodingKey, String> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| format!("invalid private_key: {e}"))
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
