//! HTTP handler for the News Verification Agent
//!
//! Edge function entry point. Every response gets the fixed CORS header
//! set, including errors, 404s and preflights.

pub mod routes;

pub use routes::{
    health_check, method_not_allowed, metrics, not_found, preflight, verify_news, HealthResponse,
};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::engine::VerificationEngine;
use crate::error::{Result, VerifyError};
use crate::telemetry::VerificationMetrics;

/// Primary route
pub const VERIFY_PATH: &str = "/verify-news";
/// Path the function was served under on its original host
pub const NETLIFY_VERIFY_PATH: &str = "/.netlify/functions/verify-news";

/// Application state, shared read-only across requests
pub struct AppState {
    pub engine: VerificationEngine,
    pub metrics: VerificationMetrics,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let metrics =
            VerificationMetrics::new().map_err(|e| VerifyError::unexpected(e.to_string()))?;
        let engine = VerificationEngine::new(&config, metrics.clone())?;

        Ok(Self {
            engine,
            metrics,
            config,
        })
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route(VERIFY_PATH, verify_route())
        .route(NETLIFY_VERIFY_PATH, verify_route())
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn verify_route() -> MethodRouter<Arc<AppState>> {
    post(verify_news)
        .options(preflight)
        .fallback(method_not_allowed)
}
