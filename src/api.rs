//! HTTP client for the backend's request/response endpoints.
//!
//! Every call maps HTTP 401 to [`Error::AuthRequired`], an explicit `error`
//! field in the body to [`Error::Api`], and any other non-success status to
//! [`Error::HttpStatus`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Credentials;
use crate::models::{ConfigDocument, SortLog, UpdateConfigReply};
use crate::{Error, Result};

/// Generic `{message}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReply {
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply from `POST /api/mock_gpio`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockGpioReply {
    #[serde(default)]
    pub lane: Option<String>,
    #[serde(default)]
    pub pin: Option<i64>,
    #[serde(default)]
    pub state: Option<i64>,
}

#[derive(Debug, Serialize)]
struct MockGpioRequest {
    /// 0 = triggered, 1 = idle
    state: u8,
    lane_index: usize,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    credentials: Option<Credentials>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_config(&self) -> Result<ConfigDocument> {
        self.get("/config").await
    }

    pub async fn update_config(&self, payload: &Map<String, Value>) -> Result<UpdateConfigReply> {
        self.post("/update_config", Some(payload)).await
    }

    pub async fn reset_maintenance(&self) -> Result<MessageReply> {
        self.post::<MessageReply, ()>("/api/reset_maintenance", None).await
    }

    /// Force a lane's sensor reading in mock mode.
    pub async fn mock_sensor(&self, lane_index: usize, active: bool) -> Result<MockGpioReply> {
        let body = MockGpioRequest {
            state: if active { 0 } else { 1 },
            lane_index,
        };
        self.post("/api/mock_gpio", Some(&body)).await
    }

    pub async fn reset_queue(&self) -> Result<MessageReply> {
        self.post::<MessageReply, ()>("/api/queue/reset", None).await
    }

    pub async fn sort_log(&self) -> Result<SortLog> {
        self.get("/api/sort_log").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let request = self.authorize(self.http.get(&url));
        decode(request.send().await?).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");
        let mut request = self.authorize(self.http.post(&url));
        if let Some(body) = body {
            request = request.json(body);
        }
        decode(request.send().await?).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
            None => request,
        }
    }
}

/// Interpret a backend reply.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        warn!(url = %response.url(), "backend requires authentication");
        return Err(Error::AuthRequired);
    }

    let text = response.text().await?;
    let body: Option<Value> = serde_json::from_str(&text).ok();

    if let Some(message) = body
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
    {
        return Err(Error::Api(message.to_string()));
    }
    if !status.is_success() {
        return Err(Error::HttpStatus(status.as_u16()));
    }

    match body {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(serde_json::from_str(&text)?),
    }
}
