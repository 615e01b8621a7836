#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde_json::{json, Value};

use sheetform::config::{Config, SheetTarget};
use sheetform::sheets::auth::AssertionClaims;
use sheetform::sheets::credentials::ServiceAccountKey;
use sheetform::sheets::{AppendOutcome, RowAppender, SheetsError};

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/service_account_key.pub.pem");
pub const TEST_CLIENT_EMAIL: &str = "form-writer@sheetform-test.iam.gserviceaccount.com";
pub const TEST_KEY_ID: &str = "0123456789abcdef";

/// A running test server instance.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON body to the submit endpoint, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/submit"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST form-urlencoded data to the submit endpoint, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/submit"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// Appender that records every row it is given instead of calling Google.
#[derive(Default)]
pub struct RecordingAppender {
    pub rows: Mutex<Vec<Vec<String>>>,
    pub calls: AtomicUsize,
    pub failure: Option<String>,
}

impl RecordingAppender {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowAppender for RecordingAppender {
    async fn append_row(&self, row: &[String]) -> Result<AppendOutcome, SheetsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(SheetsError::Http(message.clone()));
        }
        self.rows.lock().unwrap().push(row.to_vec());
        Ok(AppendOutcome {
            updated_range: Some("Sheet1!A2:K2".to_string()),
            updated_rows: Some(1),
        })
    }
}

/// Config with test defaults and the given sheet target.
pub fn test_config(sheet: Result<SheetTarget, String>) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        allow_origin: "*".to_string(),
        max_body_size: 65_536,
        expose_error_details: false,
        log_level: "warn".to_string(),
        sheet,
    }
}

pub fn service_account_json(token_uri: &str) -> String {
    json!({
        "type": "service_account",
        "project_id": "sheetform-test",
        "private_key_id": TEST_KEY_ID,
        "private_key": TEST_PRIVATE_KEY,
        "client_email": TEST_CLIENT_EMAIL,
        "client_id": "100000000000000000001",
        "token_uri": token_uri,
    })
    .to_string()
}

pub fn sheet_target(mock: &MockGoogle, sheet_name: &str) -> SheetTarget {
    SheetTarget {
        service_account: ServiceAccountKey::from_json(&service_account_json(&mock.token_uri()))
            .expect("test key should parse"),
        spreadsheet_id: "test-spreadsheet".to_string(),
        sheet_name: sheet_name.to_string(),
        api_url: mock.url(""),
    }
}

/// Serve `app` on a random local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    addr
}

/// Spawn the app around a test appender.
pub async fn spawn_app(config: Config, sheet: Result<Arc<dyn RowAppender>, String>) -> TestApp {
    let app = sheetform::build_app_with(config, sheet);
    TestApp {
        addr: serve(app).await,
        client: Client::new(),
    }
}

/// Spawn the app with the real Google Sheets client built from `config`.
pub async fn spawn_google_app(config: Config) -> TestApp {
    let app = sheetform::build_app(config);
    TestApp {
        addr: serve(app).await,
        client: Client::new(),
    }
}

pub fn valid_submission() -> Value {
    json!({
        "businessName": "Acme",
        "contactPerson": "Jo",
        "email": "jo@acme.com",
        "whatsapp": "+1555",
    })
}

// ── Mock Google APIs ────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordedAppend {
    pub spreadsheet_id: String,
    pub range: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct MockGoogleState {
    pub token_calls: AtomicUsize,
    pub token_expires_in: Mutex<Option<i64>>,
    pub token_failure: Mutex<Option<(u16, Value)>>,
    pub append_failure: Mutex<Option<(u16, Value)>>,
    pub assertions: Mutex<Vec<(Option<String>, AssertionClaims)>>,
    pub appends: Mutex<Vec<RecordedAppend>>,
    pub addr: Mutex<Option<SocketAddr>>,
}

/// Local stand-in for the OAuth2 token endpoint and the Sheets append API.
pub struct MockGoogle {
    pub addr: SocketAddr,
    pub state: Arc<MockGoogleState>,
}

impl MockGoogle {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn token_uri(&self) -> String {
        self.url("/token")
    }

    pub fn token_calls(&self) -> usize {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    pub fn appends(&self) -> Vec<RecordedAppend> {
        self.state.appends.lock().unwrap().clone()
    }

    pub fn fail_appends(&self, status: u16, body: Value) {
        *self.state.append_failure.lock().unwrap() = Some((status, body));
    }

    pub fn fail_tokens(&self, status: u16, body: Value) {
        *self.state.token_failure.lock().unwrap() = Some((status, body));
    }

    pub fn set_token_lifetime(&self, secs: i64) {
        *self.state.token_expires_in.lock().unwrap() = Some(secs);
    }
}

pub async fn spawn_mock_google() -> MockGoogle {
    let state = Arc::new(MockGoogleState::default());

    let app = Router::new()
        .route("/token", post(mock_token))
        .route("/v4/spreadsheets/{id}/values/{*range}", post(mock_append))
        .with_state(state.clone());

    let addr = serve(app).await;
    *state.addr.lock().unwrap() = Some(addr);

    MockGoogle { addr, state }
}

async fn mock_token(
    State(state): State<Arc<MockGoogleState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = state.token_calls.fetch_add(1, Ordering::SeqCst) + 1;

    if let Some((status, body)) = state.token_failure.lock().unwrap().clone() {
        return (StatusCode::from_u16(status).unwrap(), Json(body)).into_response();
    }

    if form.get("grant_type").map(String::as_str)
        != Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }

    let Some(assertion) = form.get("assertion") else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_request" }))).into_response();
    };

    let token_uri = format!("http://{}/token", state.addr.lock().unwrap().unwrap());
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[token_uri]);

    let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
    let claims = match decode::<AssertionClaims>(assertion, &key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid_grant", "error_description": e.to_string() })),
            )
                .into_response();
        }
    };
    let kid = decode_header(assertion).ok().and_then(|h| h.kid);
    state.assertions.lock().unwrap().push((kid, claims));

    let expires_in = state.token_expires_in.lock().unwrap().unwrap_or(3599);
    Json(json!({
        "access_token": format!("mock-token-{n}"),
        "expires_in": expires_in,
        "token_type": "Bearer",
    }))
    .into_response()
}

async fn mock_append(
    State(state): State<Arc<MockGoogleState>>,
    Path((spreadsheet_id, range)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.appends.lock().unwrap().push(RecordedAppend {
        spreadsheet_id,
        range: range.clone(),
        query,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        body,
    });

    if let Some((status, body)) = state.append_failure.lock().unwrap().clone() {
        return (StatusCode::from_u16(status).unwrap(), Json(body)).into_response();
    }

    let sheet = range
        .trim_end_matches(":append")
        .split('!')
        .next()
        .unwrap_or("Sheet1")
        .to_string();

    Json(json!({
        "spreadsheetId": "test-spreadsheet",
        "tableRange": format!("{sheet}!A1:K1"),
        "updates": {
            "spreadsheetId": "test-spreadsheet",
            "updatedRange": format!("{sheet}!A2:K2"),
            "updatedRows": 1,
            "updatedColumns": 11,
            "updatedCells": 11,
        }
    }))
    .into_response()
}
