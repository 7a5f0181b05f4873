//! HTTP API for the sizing engine, health checks and Prometheus metrics

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use sizing_core::{
    estimate, parse_request, validate, Catalog, ConfiguratorState, EngineMetrics,
    FixedWindowLimiter, Operation, RateDecision, RateLimiter, Recommender, RevenueLeakInput,
    StructuredLogger, Validate, WorkloadIntent, WorkloadIntentLite,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::SizingConfig;
use crate::error::{ApiError, NO_STORE};

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

const ANONYMOUS_CLIENT: &str = "anonymous";

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Shared application state
pub struct AppState {
    pub recommender: Recommender,
    pub metrics: EngineMetrics,
    pub logger: StructuredLogger,
    limiters: HashMap<Operation, Arc<dyn RateLimiter>>,
}

impl AppState {
    /// Build state with one fixed-window limiter per operation
    pub fn new(config: &SizingConfig, catalog: Catalog) -> Self {
        let window = config.rate_limit_window();
        let limiters = Operation::ALL
            .iter()
            .map(|op| {
                let limiter: Arc<dyn RateLimiter> =
                    Arc::new(FixedWindowLimiter::new(config.limit_for(*op), window));
                (*op, limiter)
            })
            .collect();

        let metrics = EngineMetrics::new();
        metrics.set_catalog_skus(catalog.len());

        Self {
            recommender: Recommender::new(catalog).with_max_candidates(config.max_candidates),
            metrics,
            logger: StructuredLogger::new("sizing-api"),
            limiters,
        }
    }

    /// Replace the limiter guarding one operation
    pub fn with_limiter(mut self, op: Operation, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiters.insert(op, limiter);
        self
    }

    fn limiter(&self, op: Operation) -> Option<&Arc<dyn RateLimiter>> {
        self.limiters.get(&op)
    }
}

/// Client identity for rate limiting: first X-Forwarded-For entry
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

fn apply_rate_headers(response: &mut Response, decision: &RateDecision) {
    let reset_ms = chrono::Utc::now().timestamp_millis() + decision.reset_after.as_millis() as i64;
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_ms));
}

/// Rate limit, check content type, parse, evaluate and respond
fn evaluate<T, R>(
    state: &AppState,
    op: Operation,
    headers: &HeaderMap,
    body: &[u8],
    run: impl FnOnce(&AppState, T) -> R,
) -> Response
where
    T: DeserializeOwned + Validate,
    R: Serialize,
{
    let client = client_key(headers);
    let decision = state
        .limiter(op)
        .map(|l| l.check_and_increment(&format!("rate-limit:{}:{}", op, client)));

    let outcome = match decision {
        Some(d) if !d.allowed => {
            state.metrics.inc_rate_limited(op);
            state
                .logger
                .log_rate_limited(op, &client, d.reset_after.as_secs());
            Err(ApiError::RateLimited {
                retry_after_secs: d.reset_after.as_secs().max(1),
            })
        }
        _ => run_checked(state, op, headers, body, run),
    };

    let mut response = match outcome {
        Ok(response) => response,
        Err(err) => {
            if !matches!(err, ApiError::RateLimited { .. }) {
                state.metrics.inc_request(op, "rejected");
                state.logger.log_rejected(op, err.code(), &err.to_string());
            }
            err.into_response()
        }
    };

    if let Some(d) = decision {
        apply_rate_headers(&mut response, &d);
    }
    response
}

fn run_checked<T, R>(
    state: &AppState,
    op: Operation,
    headers: &HeaderMap,
    body: &[u8],
    run: impl FnOnce(&AppState, T) -> R,
) -> Result<Response, ApiError>
where
    T: DeserializeOwned + Validate,
    R: Serialize,
{
    if !is_json(headers) {
        return Err(ApiError::BadRequest(
            "Content-Type must be application/json".to_string(),
        ));
    }

    let request: T = parse_request(body)?;

    let start = Instant::now();
    let result = run(state, request);
    state
        .metrics
        .observe_evaluation(op, start.elapsed().as_secs_f64());
    state.metrics.inc_request(op, "ok");

    Ok((StatusCode::OK, Json(result)).into_response())
}

async fn estimate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    evaluate(&state, Operation::Estimate, &headers, &body, |s, intent: WorkloadIntent| {
        let result = estimate(&intent);
        s.logger.log_estimate(&intent, &result);
        result
    })
}

async fn validate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    evaluate(&state, Operation::Validate, &headers, &body, |s, build: ConfiguratorState| {
        let result = validate(&build);
        if !result.is_valid {
            s.metrics.inc_invalid_builds();
        }
        s.logger.log_build_validation(&build.cpu_model, &result);
        result
    })
}

async fn recommend_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    evaluate(&state, Operation::Recommend, &headers, &body, |s, intent: WorkloadIntentLite| {
        let result = s.recommender.recommend(&intent);
        s.logger.log_recommendation(intent.app_type.as_str(), &result);
        result
    })
}

async fn leak_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    evaluate(&state, Operation::Leak, &headers, &body, |s, input: RevenueLeakInput| {
        let result = input.score();
        s.logger.log_leak(&result);
        result
    })
}

async fn catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.recommender.catalog().skus().to_vec())
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": SERVICE_VERSION,
        "catalogSkus": state.recommender.catalog().len(),
    }))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<Response, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response())
}

async fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/estimate", post(estimate_handler))
        .route("/configurator/validate", post(validate_handler))
        .route("/recommend", post(recommend_handler))
        .route("/revenue-leak", post(leak_handler))
        .route("/catalog", get(catalog))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .layer(middleware::map_response(no_store))
        .with_state(state)
}

async fn shutdown_signal(logger: StructuredLogger) {
    if tokio::signal::ctrl_c().await.is_ok() {
        logger.log_shutdown("SIGINT received");
    }
}

/// Start the API server and run until Ctrl-C
pub async fn serve(config: &SizingConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let logger = state.logger.clone();
    let catalog_skus = state.recommender.catalog().len();
    let app = create_router(state);

    let addr = config.bind_addr();
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    logger.log_startup(SERVICE_VERSION, &addr, catalog_skus);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(logger))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key_uses_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers), "anonymous");

        headers.insert("x-forwarded-for", HeaderValue::from_static(" 10.0.0.1 , 10.0.0.2"));
        assert_eq!(client_key(&headers), "10.0.0.1");

        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_key(&headers), "anonymous");
    }

    #[test]
    fn test_is_json_accepts_charset_suffix() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
    }
}
