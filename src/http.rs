use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;

use crate::error::Result;

pub const DEFAULT_API_URL: &str = "https://screeps.com/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Read access to the Screeps web API.
///
/// `get` never fails: transport and decode problems come back as
/// `{"error": "<message>"}` so callers probe for the keys they need.
pub trait ScreepsApi {
    fn get(&self, endpoint: &str) -> impl Future<Output = Value> + Send;
}

pub(crate) fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

pub(crate) fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    }
}

pub fn error_value(error: impl std::fmt::Display) -> Value {
    json!({ "error": error.to_string() })
}

#[derive(Debug, Clone)]
pub struct ScreepsClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ScreepsClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!("screeps-game-state/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ScreepsClient {
            client,
            base_url: normalize_base_url(base_url),
            token: token.trim().to_string(),
        })
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, normalize_endpoint(endpoint))
    }

    async fn perform_get(&self, endpoint: &str) -> std::result::Result<Value, String> {
        let url = self.url(endpoint);
        let mut req = self.client.get(&url).header("Accept", "application/json");
        if !self.token.is_empty() {
            req = req.header("X-Token", &self.token);
        }

        let response = req.send().await.map_err(|error| format!("request failed: {}", error))?;
        let status = response.status();

        let bytes = response
            .bytes()
            .await
            .map_err(|error| format!("failed to read response body: {}", error))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(data) => {
                if !status.is_success() {
                    tracing::warn!(%url, status = status.as_u16(), "non-success status");
                }
                Ok(data)
            }
            Err(error) if status.is_success() => Err(format!("invalid JSON response: {}", error)),
            Err(_) => Err(format!("HTTP {}", status.as_u16())),
        }
    }
}

impl ScreepsApi for ScreepsClient {
    async fn get(&self, endpoint: &str) -> Value {
        tracing::debug!(endpoint, "GET");
        match self.perform_get(endpoint).await {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(endpoint, %error, "request failed");
                error_value(error)
            }
        }
    }
}
