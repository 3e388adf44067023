use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::cricapi::{CricketProvider, ProviderError};
use crate::scores::{filter_matches, normalize_matches, FilterTag};

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn CricketProvider>,
    /// Off: every failure is a 500, the shape existing clients expect.
    pub distinct_error_status: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Build the Axum router for the proxy.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/matches/current", get(current_matches_handler))
        .route("/api/matches/:id", get(match_handler))
        .route("/api/matches/:id/scorecard", get(scorecard_handler))
        .route("/api/matches/:id/live", get(live_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

impl AppState {
    /// Log the internal error class and reduce it to the endpoint's public message.
    fn fail(&self, err: ProviderError, message: &str, context: &str) -> ApiError {
        let distinct = match err {
            ProviderError::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProviderError::UpstreamMalformed(_) => StatusCode::BAD_GATEWAY,
            ProviderError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        self.respond(distinct, message, context, &err)
    }

    fn respond(
        &self,
        distinct: StatusCode,
        message: &str,
        context: &str,
        cause: &dyn std::fmt::Display,
    ) -> ApiError {
        let status = if self.distinct_error_status {
            distinct
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        error!(
            provider = self.provider.name(),
            status = status.as_u16(),
            "Error fetching {}: {}",
            context,
            cause
        );
        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    filter: FilterTag,
}

/// GET /api/health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "provider": state.provider.name() }))
}

/// GET /api/matches/current?filter=live
async fn current_matches_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const MESSAGE: &str = "Failed to fetch current matches";
    let Query(query) = query
        .map_err(|e| state.respond(StatusCode::BAD_REQUEST, MESSAGE, "current matches", &e))?;
    let payload = state
        .provider
        .current_matches()
        .await
        .map_err(|e| state.fail(e, MESSAGE, "current matches"))?;
    let matches =
        normalize_matches(&payload).map_err(|e| state.fail(e, MESSAGE, "current matches"))?;
    Ok(Json(filter_matches(&matches, query.filter)))
}

/// GET /api/matches/:id
async fn match_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .provider
        .match_info(&id)
        .await
        .map(Json)
        .map_err(|e| state.fail(e, "Failed to fetch match details", &format!("match {}", id)))
}

/// GET /api/matches/:id/scorecard
async fn scorecard_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .provider
        .match_scorecard(&id)
        .await
        .map(Json)
        .map_err(|e| {
            state.fail(e, "Failed to fetch scorecard", &format!("scorecard for match {}", id))
        })
}

/// GET /api/matches/:id/live
async fn live_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .provider
        .match_live(&id)
        .await
        .map(Json)
        .map_err(|e| {
            state.fail(e, "Failed to fetch live score", &format!("live score for match {}", id))
        })
}
