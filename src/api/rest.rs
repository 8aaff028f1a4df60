// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and are read-only. There is no
// authentication: the service only fetches public market data and returns
// analyses, and binds to localhost by default.
//
// CORS is permissive so a local browser front-end can call it directly.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::analysis::Analyzer;
use crate::error::AdviserError;
use crate::link::marketplace_url;
use crate::market_data::{resolve_asset, Asset, SUPPORTED_ASSETS};

/// Shared, read-only state for every handler.
pub struct ApiState {
    pub analyzer: Analyzer,
    pub default_days: u32,
}

// =============================================================================
// Router construction
// =============================================================================

pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/assets", get(assets))
        .route("/api/v1/assets/:asset/link", get(asset_link))
        .route("/api/v1/analysis/:asset", get(analysis))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

struct ApiError(AdviserError);

impl From<AdviserError> for ApiError {
    fn from(err: AdviserError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AdviserError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AdviserError::FetchFailure(_) => StatusCode::BAD_GATEWAY,
        };
        warn!(%status, error = %self.0, "request failed");
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

async fn assets() -> Json<&'static [Asset]> {
    Json(SUPPORTED_ASSETS)
}

#[derive(Serialize)]
struct LinkResponse {
    asset: Asset,
    url: String,
}

async fn asset_link(Path(asset): Path<String>) -> Result<Json<LinkResponse>, ApiError> {
    let asset = resolve_asset(&asset)?;
    Ok(Json(LinkResponse {
        url: marketplace_url(&asset),
        asset,
    }))
}

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    days: Option<u32>,
}

async fn analysis(
    State(state): State<Arc<ApiState>>,
    Path(asset): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Response, ApiError> {
    let days = query.days.unwrap_or(state.default_days);
    let report = state.analyzer.analyze(&asset, days).await?;
    Ok(Json(report).into_response())
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::analysis::tests::FixedSource;
    use crate::pipeline::PipelineConfig;

    fn app(prices: Vec<f64>, fail: bool) -> Router {
        let analyzer =
            Analyzer::new(Arc::new(FixedSource { prices, fail }), PipelineConfig::default())
                .unwrap();
        router(Arc::new(ApiState {
            analyzer,
            default_days: 30,
        }))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json(app(vec![], false), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn assets_lists_supported_table() {
        let (status, body) = get_json(app(vec![], false), "/api/v1/assets").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), SUPPORTED_ASSETS.len());
        assert_eq!(body[0]["id"], "bitcoin");
    }

    #[tokio::test]
    async fn link_for_known_and_unknown_assets() {
        let (status, body) = get_json(app(vec![], false), "/api/v1/assets/Solana/link").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://www.coingecko.com/en/coins/solana");

        let (status, body) = get_json(app(vec![], false), "/api/v1/assets/tether/link").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn analysis_returns_rows_and_advice() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let (status, body) =
            get_json(app(prices, false), "/api/v1/analysis/bitcoin?days=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["days"], 10);
        assert_eq!(body["rows"].as_array().unwrap().len(), 11);
        assert_eq!(body["advice"].as_array().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn analysis_uses_default_days() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let (_, body) = get_json(app(prices, false), "/api/v1/analysis/bitcoin").await;
        assert_eq!(body["days"], 30);
        assert_eq!(body["rows"].as_array().unwrap().len(), 31);
    }

    #[tokio::test]
    async fn fetch_failure_is_bad_gateway() {
        let (status, body) = get_json(app(vec![], true), "/api/v1/analysis/ethereum").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["kind"], "fetch_failure");
    }

    #[tokio::test]
    async fn zero_days_is_bad_request() {
        let (status, _) = get_json(app(vec![1.0], false), "/api/v1/analysis/ethereum?days=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
