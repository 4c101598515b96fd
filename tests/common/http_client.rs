//! HTTP client helpers for tests.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
const USER_ID_HEADER: &str = "x-user-id";
const STATUS_HEADER: &str = "x-lostfound-status";

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

/// Status code, `x-lostfound-status` header and JSON body of one response.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub lostfound_status: String,
    pub body: Value,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    fn as_user(builder: reqwest::RequestBuilder, user: Option<u64>) -> reqwest::RequestBuilder {
        match user {
            Some(id) => builder.header(USER_ID_HEADER, id.to_string()),
            None => builder,
        }
    }

    async fn read(resp: reqwest::Response) -> Result<ApiResponse, TestClientError> {
        let status = resp.status().as_u16();
        let lostfound_status = resp
            .headers()
            .get(STATUS_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let text = resp.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|_| TestClientError::NotJson(text))?
        };
        Ok(ApiResponse {
            status,
            lostfound_status,
            body,
        })
    }

    pub async fn get(&self, path: &str, user: Option<u64>) -> Result<ApiResponse, TestClientError> {
        let builder = Self::as_user(self.client.get(self.url(path)), user);
        Self::read(builder.send().await?).await
    }

    pub async fn post(
        &self,
        path: &str,
        user: Option<u64>,
        body: &Value,
    ) -> Result<ApiResponse, TestClientError> {
        let builder = Self::as_user(self.client.post(self.url(path)), user);
        Self::read(builder.json(body).send().await?).await
    }

    /// Registers `username` and returns the new user id.
    pub async fn register(&self, username: &str, phone: &str) -> Result<u64, TestClientError> {
        let resp = self
            .post(
                "/v1/users",
                None,
                &json!({ "username": username, "phone_number": phone }),
            )
            .await?;
        match resp.status {
            201 => resp.body["id"]
                .as_u64()
                .ok_or(TestClientError::UnexpectedStatus(201, resp.body.to_string())),
            status => Err(TestClientError::UnexpectedStatus(status, resp.body.to_string())),
        }
    }

    pub async fn report(&self, user: u64, report: &Value) -> Result<ApiResponse, TestClientError> {
        self.post("/v1/items", Some(user), report).await
    }

    pub async fn confirm_return(
        &self,
        user: u64,
        match_id: u64,
    ) -> Result<ApiResponse, TestClientError> {
        let path = format!("/v1/matches/{}/return", match_id);
        self.post(&path, Some(user), &json!({})).await
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/healthz")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }

    pub async fn ready(&self) -> Result<ReadyResponse, TestClientError> {
        let resp = self.client.get(self.url("/ready")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }
}

/// A report JSON body for `item_type` using one of the harness uploads.
pub fn report_body(item_type: &str, title: &str, image_file: &str) -> Value {
    json!({
        "item_type": item_type,
        "title": title,
        "image_file": image_file,
        "location": { "latitude": 40.7, "longitude": -74.0 },
        "location_landmark": "Student union"
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentStatus {
    pub http: String,
    pub storage: String,
    pub embedding: String,
    pub embedder_mode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

impl ReadyResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Response body is not JSON: {0}")]
    NotJson(String),
}
