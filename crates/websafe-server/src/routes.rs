//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use websafe_classifiers::BatchItem;
use websafe_core::{validate_request_url, EvidenceItem, PredictionResult, Tier, Verdict};

use crate::state::AppState;

const SERVICE_NAME: &str = "WebSafe Detection API";
const INVALID_URL_MESSAGE: &str = "Invalid URL format";
const PREDICTION_FAILED_MESSAGE: &str = "Prediction failed";

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .route("/batch-predict", post(batch_predict))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when no origins are configured, otherwise the configured list
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

async fn api_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/predict": "POST - Predict if a single URL is phishing (expects {\"url\": \"string\"})",
            "/batch-predict": "POST - Predict for multiple URLs (expects {\"urls\": [\"string\", ...]})",
            "/health": "GET - Check API health status",
            "/metrics": "GET - Prometheus metrics",
        },
        "backend_url": state.config.base_url,
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "message": format!("{} is running", SERVICE_NAME),
        "timestamp": timestamp(),
        "backend_url": state.config.base_url,
        "model_loaded": state.detector.is_ready(),
    }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchPredictRequest {
    #[serde(default)]
    pub urls: Option<Vec<String>>,
}

/// One evidence entry on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub icon: String,
    pub status: Tier,
    pub description: String,
}

impl From<EvidenceItem> for Parameter {
    fn from(item: EvidenceItem) -> Self {
        Self {
            name: item.name,
            icon: item.icon,
            status: item.tier,
            description: item.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub score: f64,
    pub url: String,
    pub parameters: Vec<Parameter>,
    pub message: String,
    pub timestamp: String,
    pub prediction: Verdict,
}

impl PredictResponse {
    fn new(url: String, result: PredictionResult) -> Self {
        Self {
            score: result.score,
            url,
            message: result.verdict.message(),
            parameters: result.evidence.into_iter().map(Parameter::from).collect(),
            timestamp: timestamp(),
            prediction: result.verdict,
        }
    }
}

/// One batch entry on the wire. Rejected entries carry no prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub url: String,
    pub score: f64,
    pub parameters: Vec<Parameter>,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Verdict>,
}

impl From<BatchItem> for BatchEntry {
    fn from(item: BatchItem) -> Self {
        match item {
            BatchItem::Scored { url, result } if result.is_error() => Self {
                url,
                score: 0.0,
                parameters: Vec::new(),
                message: PREDICTION_FAILED_MESSAGE.to_string(),
                timestamp: timestamp(),
                prediction: Some(Verdict::Error),
            },
            BatchItem::Scored { url, result } => {
                let response = PredictResponse::new(url, result);
                Self {
                    url: response.url,
                    score: response.score,
                    parameters: response.parameters,
                    message: response.message,
                    timestamp: response.timestamp,
                    prediction: Some(response.prediction),
                }
            }
            BatchItem::Rejected { url, .. } => Self {
                url,
                score: 0.0,
                parameters: Vec::new(),
                message: INVALID_URL_MESSAGE.to_string(),
                timestamp: timestamp(),
                prediction: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictResponse {
    pub results: Vec<BatchEntry>,
}

/// Single URL prediction
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    metrics::counter!("websafe_requests_total", "endpoint" => "predict").increment(1);

    let Json(req) = payload?;
    debug!("Received /predict request: {:?}", req);

    let raw = req
        .url
        .ok_or_else(|| AppError::InvalidRequest("URL is required".to_string()))?;

    let url = validate_request_url(&raw).map_err(|e| {
        warn!("Invalid URL format: {}", e);
        AppError::InvalidRequest(INVALID_URL_MESSAGE.to_string())
    })?;

    let result = state.detector.predict(&url).await;
    if result.is_error() {
        error!("Prediction failed for {}", url);
        return Err(AppError::PredictionFailed);
    }

    info!("Prediction for {}: {} ({})", url, result.verdict, result.score);
    Ok(Json(PredictResponse::new(url, result)))
}

/// Batch prediction; malformed entries are flagged individually
async fn batch_predict(
    State(state): State<AppState>,
    payload: Result<Json<BatchPredictRequest>, JsonRejection>,
) -> Result<Json<BatchPredictResponse>, AppError> {
    metrics::counter!("websafe_requests_total", "endpoint" => "batch_predict").increment(1);

    let urls = payload
        .ok()
        .and_then(|Json(req)| req.urls)
        .ok_or_else(|| AppError::InvalidRequest("URLs array is required".to_string()))?;

    let count = urls.len();
    let results = state
        .detector
        .predict_batch(urls)
        .await
        .into_iter()
        .map(BatchEntry::from)
        .collect();

    info!("Batch prediction completed for {} URLs", count);
    Ok(Json(BatchPredictResponse { results }))
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// HTTP-facing errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Prediction failed")]
    PredictionFailed,

    #[error("Not found")]
    NotFound,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection);
        AppError::InvalidRequest("URL is required".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            AppError::PredictionFailed => (StatusCode::INTERNAL_SERVER_ERROR, "prediction_error"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        };

        let body = json!({
            "error": self.to_string(),
            "type": kind,
        });

        (status, Json(body)).into_response()
    }
}
