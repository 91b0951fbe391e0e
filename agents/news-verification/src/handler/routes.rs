//! Route handlers
//!
//! - POST /verify-news - SIFT verification report
//! - OPTIONS /verify-news - CORS preflight
//! - GET /health - Health check
//! - GET /metrics - Prometheus exposition

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, FailedToBufferBody},
        State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::AppState;
use crate::contracts::VerificationRequest;
use crate::engine::Verification;
use crate::error::{Result, VerifyError};
use crate::{AGENT_ID, AGENT_VERSION};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// POST /verify-news
///
/// Always answers with JSON: the report on success, an error body otherwise.
pub async fn verify_news(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let result = run_verification(&state, body).await;

    let duration_ms = start_time.elapsed().as_millis() as u64;

    let mut response = match result {
        Ok(verification) => {
            tracing::info!(
                request_id = %request_id,
                origin = verification.origin.as_str(),
                rating = %verification.report.credibility_rating,
                duration_ms = duration_ms,
                "Verification completed"
            );
            state.metrics.record_request("success");
            (StatusCode::OK, Json(verification.report)).into_response()
        }
        Err(err) => {
            if err.status_code().is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    error = %err,
                    code = err.error_code(),
                    duration_ms = duration_ms,
                    "Verification failed"
                );
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    error = %err,
                    code = err.error_code(),
                    "Verification request rejected"
                );
            }
            state.metrics.record_request(err.outcome());
            err.into_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn run_verification(
    state: &AppState,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Verification> {
    let request: VerificationRequest = parse_request_body(body, state.config.max_body_bytes)?;
    state.engine.verify(request).await
}

/// OPTIONS /verify-news: empty 200; CORS headers come from the router layers
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on a verification path
pub async fn method_not_allowed(State(state): State<Arc<AppState>>) -> VerifyError {
    state.metrics.record_request(VerifyError::MethodNotAllowed.outcome());
    VerifyError::MethodNotAllowed
}

pub async fn not_found() -> VerifyError {
    VerifyError::NotFound
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        agent_id: AGENT_ID.to_string(),
        agent_version: AGENT_VERSION.to_string(),
        credentials_configured: state.engine.credentials().is_complete(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => VerifyError::unexpected(e.to_string()).into_response(),
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent_id: String,
    pub agent_version: String,
    pub credentials_configured: bool,
    pub timestamp: String,
}

/// Parse the buffered body as JSON. The size cap is enforced by the
/// router's `DefaultBodyLimit`; `max_size` is only reported back.
fn parse_request_body<T>(
    body: std::result::Result<Bytes, BytesRejection>,
    max_size: usize,
) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = body.map_err(|rejection| match rejection {
        BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
            VerifyError::BodyTooLarge { limit: max_size }
        }
        other => {
            tracing::warn!(error = %other, "Failed to read request body");
            VerifyError::InvalidJson(other.body_text())
        }
    })?;

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{body::Body, extract::FromRequest, http::Request};

    /// Buffer `payload` the way the extractor does, under axum's default cap
    async fn buffered(payload: impl Into<Body>) -> std::result::Result<Bytes, BytesRejection> {
        Bytes::from_request(Request::new(payload.into()), &()).await
    }

    #[tokio::test]
    async fn test_parse_request_body() {
        let body = buffered(r#"{"content":"claim","source":"blog"}"#).await;
        let request: VerificationRequest = parse_request_body(body, 1024).unwrap();
        assert_eq!(request.content.as_deref(), Some("claim"));
        assert_eq!(request.source.as_deref(), Some("blog"));
    }

    #[tokio::test]
    async fn test_parse_request_body_rejects_malformed_json() {
        let body = buffered("{not json").await;
        let err = parse_request_body::<VerificationRequest>(body, 1024).unwrap_err();
        assert!(matches!(err, VerifyError::InvalidJson(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parse_request_body_enforces_limit() {
        let oversized = format!(r#"{{"content":"{}"}}"#, "x".repeat(3 * 1024 * 1024));
        let body = buffered(oversized).await;
        assert!(matches!(
            body,
            Err(BytesRejection::FailedToBufferBody(
                FailedToBufferBody::LengthLimitError(_)
            ))
        ));
        let err = parse_request_body::<VerificationRequest>(body, 2048).unwrap_err();
        assert!(matches!(err, VerifyError::BodyTooLarge { limit: 2048 }));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_preflight_is_empty_ok() {
        assert_eq!(preflight().await, StatusCode::OK);
    }
}
