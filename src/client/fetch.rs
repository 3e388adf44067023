use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::scores::{parse_live_score, LiveScore, Match};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("proxy answered {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Typed access to the proxy's `/api` surface.
#[derive(Clone)]
pub struct ProxyClient {
    http: Client,
    base_url: Url,
}

impl ProxyClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid proxy base URL '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("proxy base URL '{}' cannot carry a path", base_url);
        }
        Ok(ProxyClient { http, base_url })
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string));
            return Err(ClientError::Status { status, message });
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn get_matches(&self) -> Result<Vec<Match>, ClientError> {
        self.get_json(&["matches", "current"]).await.inspect_err(|e| {
            error!("Error fetching matches: {}", e);
        })
    }

    pub async fn get_match_by_id(&self, id: &str) -> Result<Value, ClientError> {
        self.get_json(&["matches", id]).await.inspect_err(|e| {
            error!("Error fetching match {}: {}", id, e);
        })
    }

    pub async fn get_live_score(&self, id: &str) -> Result<LiveScore, ClientError> {
        let raw: Value = self
            .get_json(&["matches", id, "live"])
            .await
            .inspect_err(|e| error!("Error fetching live score for match {}: {}", id, e))?;
        parse_live_score(&raw).map_err(|e| {
            error!("Error reading live score for match {}: {}", id, e);
            ClientError::Decode(e.to_string())
        })
    }

    pub async fn get_scorecard(&self, id: &str) -> Result<Value, ClientError> {
        self.get_json(&["matches", id, "scorecard"])
            .await
            .inspect_err(|e| {
                error!("Error fetching scorecard for match {}: {}", id, e);
            })
    }
}
