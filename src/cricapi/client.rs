use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::provider::{CricketProvider, ProviderError};
use crate::config::Config;

/// Client for the CricAPI v1 REST endpoints.
#[derive(Clone)]
pub struct CricApi {
    http: Client,
    /// Base URL for overriding in tests
    base_url: String,
    api_key: String,
}

impl CricApi {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .cricapi_key
            .as_deref()
            .context("CRICAPI_KEY is not set")?;
        Self::with_base_url(&config.cricapi_host, api_key, config.upstream_timeout())
    }

    pub fn with_base_url(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(CricApi {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, endpoint: &str, id: Option<&str>) -> Result<Value, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Fetching {} (id={:?})", url, id);

        let mut req = self.http.get(&url).header("apikey", &self.api_key);
        if let Some(id) = id {
            req = req.query(&[("id", id)]);
        }

        let resp = req.send().await.map_err(|e| {
            ProviderError::UpstreamUnavailable(format!("{} request failed: {}", endpoint, e))
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(format!(
                "{} has nothing for id {}",
                endpoint,
                id.unwrap_or("-")
            )));
        }
        if !status.is_success() {
            return Err(ProviderError::UpstreamUnavailable(format!(
                "{} returned {}",
                endpoint, status
            )));
        }

        let body: Value = resp.json().await.map_err(|e| {
            ProviderError::UpstreamMalformed(format!("{} body is not JSON: {}", endpoint, e))
        })?;

        check_envelope(endpoint, body)
    }
}

/// CricAPI reports some failures in a 200 body: `{"status": "failure", "reason": ...}`.
fn check_envelope(endpoint: &str, body: Value) -> Result<Value, ProviderError> {
    if body["status"].as_str() != Some("failure") {
        return Ok(body);
    }
    let reason = body["reason"].as_str().unwrap_or("unspecified failure");
    let lower = reason.to_lowercase();
    if ["not found", "invalid id", "no match"]
        .iter()
        .any(|n| lower.contains(n))
    {
        Err(ProviderError::NotFound(format!("{}: {}", endpoint, reason)))
    } else {
        Err(ProviderError::UpstreamUnavailable(format!(
            "{}: {}",
            endpoint, reason
        )))
    }
}

#[async_trait]
impl CricketProvider for CricApi {
    fn name(&self) -> &str {
        "CricAPI"
    }

    async fn current_matches(&self) -> Result<Value, ProviderError> {
        self.get("currentMatches", None).await
    }

    async fn match_info(&self, id: &str) -> Result<Value, ProviderError> {
        self.get("match_info", Some(id)).await
    }

    async fn match_scorecard(&self, id: &str) -> Result<Value, ProviderError> {
        self.get("match_scorecard", Some(id)).await
    }

    async fn match_live(&self, id: &str) -> Result<Value, ProviderError> {
        self.get("match_live", Some(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fake_cricapi() -> Router {
        Router::new()
            .route(
                "/currentMatches",
                get(|headers: HeaderMap| async move {
                    let key = headers
                        .get("apikey")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({"status": "success", "data": [], "apikey": key}))
                }),
            )
            .route(
                "/match_info",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    match q.get("id").map(String::as_str) {
                        Some("gone") => Json(json!({"status": "failure", "reason": "Match not found"})),
                        Some("quota") => Json(json!({"status": "failure", "reason": "Blocked for 15 minutes"})),
                        id => Json(json!({"status": "success", "data": {"id": id}})),
                    }
                }),
            )
            .route("/match_scorecard", get(|| async { StatusCode::NOT_FOUND }))
            .route("/match_live", get(|| async { (StatusCode::BAD_GATEWAY, "down") }))
    }

    async fn client() -> CricApi {
        let base = spawn_upstream(fake_cricapi()).await;
        CricApi::with_base_url(&format!("{}/", base), "secret", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_sends_api_key_header() {
        let api = client().await;
        let body = api.current_matches().await.unwrap();
        assert_eq!(body["apikey"], "secret");
    }

    #[tokio::test]
    async fn test_passes_id_as_query() {
        let api = client().await;
        let body = api.match_info("a b&c").await.unwrap();
        assert_eq!(body["data"]["id"], "a b&c");
    }

    #[tokio::test]
    async fn test_failure_envelope() {
        let api = client().await;
        assert!(matches!(
            api.match_info("gone").await,
            Err(ProviderError::NotFound(_))
        ));
        assert!(matches!(
            api.match_info("quota").await,
            Err(ProviderError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let api = client().await;
        assert!(matches!(
            api.match_scorecard("x").await,
            Err(ProviderError::NotFound(_))
        ));
        assert!(matches!(
            api.match_live("x").await,
            Err(ProviderError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api =
            CricApi::with_base_url(&format!("http://{}", addr), "k", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            api.current_matches().await,
            Err(ProviderError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let app = Router::new().route("/currentMatches", get(|| async { "<html>oops</html>" }));
        let base = spawn_upstream(app).await;
        let api = CricApi::with_base_url(&base, "k", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            api.current_matches().await,
            Err(ProviderError::UpstreamMalformed(_))
        ));
    }
}
