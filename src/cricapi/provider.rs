use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Why a provider call produced nothing usable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport failure, timeout, or a non-2xx answer.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The provider answered, but not with data we can use.
    #[error("upstream returned malformed data: {0}")]
    UpstreamMalformed(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Trait that every cricket data provider must implement.
///
/// Payloads are returned as raw provider JSON; shaping them is left to the
/// normalization layer.
#[async_trait]
pub trait CricketProvider: Send + Sync {
    async fn current_matches(&self) -> Result<Value, ProviderError>;

    async fn match_info(&self, id: &str) -> Result<Value, ProviderError>;

    async fn match_scorecard(&self, id: &str) -> Result<Value, ProviderError>;

    async fn match_live(&self, id: &str) -> Result<Value, ProviderError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
