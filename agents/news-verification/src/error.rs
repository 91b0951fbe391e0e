//! Error types for the News Verification Agent
//!
//! Every failure maps to an HTTP status, a stable error code and a JSON
//! body. A model reply that cannot be parsed is not an error; the engine
//! substitutes the default report instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for verification requests
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Body fields missing or empty
    #[error("{0}")]
    InvalidInput(String),

    /// Body is not a JSON object of the expected shape
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    NotFound,

    /// One or both upstream credentials are not configured
    #[error("API credentials not configured")]
    MissingCredentials { has_api_key: bool, has_app_id: bool },

    /// Upstream answered with a non-success status
    #[error("API request failed with status {status}")]
    Upstream { status: u16, body: String },

    /// Upstream answered 2xx but the envelope could not be decoded
    #[error("Upstream response could not be decoded: {0}")]
    MalformedUpstream(String),

    #[error("Upstream request timed out after {0}ms")]
    UpstreamTimeout(u64),

    #[error("{0}")]
    Unexpected(String),
}

impl VerifyError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        VerifyError::InvalidInput(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        VerifyError::Unexpected(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerifyError::InvalidInput(_) | VerifyError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            VerifyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            VerifyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            VerifyError::NotFound => StatusCode::NOT_FOUND,
            VerifyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            VerifyError::MissingCredentials { .. }
            | VerifyError::Upstream { .. }
            | VerifyError::MalformedUpstream(_)
            | VerifyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            VerifyError::InvalidInput(_) => "INVALID_INPUT",
            VerifyError::InvalidJson(_) => "INVALID_JSON",
            VerifyError::BodyTooLarge { .. } => "BODY_TOO_LARGE",
            VerifyError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            VerifyError::NotFound => "NOT_FOUND",
            VerifyError::MissingCredentials { .. } => "CONFIGURATION_ERROR",
            VerifyError::Upstream { .. } | VerifyError::MalformedUpstream(_) => "UPSTREAM_ERROR",
            VerifyError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            VerifyError::Unexpected(_) => "INTERNAL_ERROR",
        }
    }

    /// Label used for the `outcome` metric
    pub fn outcome(&self) -> &'static str {
        match self {
            VerifyError::InvalidInput(_)
            | VerifyError::InvalidJson(_)
            | VerifyError::BodyTooLarge { .. } => "invalid_input",
            VerifyError::MethodNotAllowed | VerifyError::NotFound => "rejected",
            VerifyError::MissingCredentials { .. } => "configuration_error",
            VerifyError::Upstream { .. } | VerifyError::MalformedUpstream(_) => "upstream_error",
            VerifyError::UpstreamTimeout(_) => "upstream_timeout",
            VerifyError::Unexpected(_) => "internal_error",
        }
    }

    /// Build the JSON body. Upstream response text never leaves the process.
    pub fn to_body(&self) -> ErrorBody {
        let body = ErrorBody::new(self.error_code(), self.headline());
        match self {
            VerifyError::InvalidInput(_) | VerifyError::MethodNotAllowed | VerifyError::NotFound => {
                body
            }
            VerifyError::MissingCredentials {
                has_api_key,
                has_app_id,
            } => body
                .with_message(self.to_string())
                .with_credential_flags(*has_api_key, *has_app_id),
            VerifyError::MalformedUpstream(_) => {
                body.with_message("Upstream response could not be decoded")
            }
            _ => body.with_message(self.to_string()),
        }
    }

    fn headline(&self) -> String {
        match self {
            VerifyError::InvalidInput(msg) => msg.clone(),
            VerifyError::InvalidJson(_) => "Invalid JSON body".to_string(),
            VerifyError::BodyTooLarge { .. } => "Request body too large".to_string(),
            VerifyError::MethodNotAllowed => "Method not allowed".to_string(),
            VerifyError::NotFound => "Not found".to_string(),
            VerifyError::MissingCredentials { .. } => "Server configuration error".to_string(),
            VerifyError::Upstream { .. }
            | VerifyError::MalformedUpstream(_)
            | VerifyError::UpstreamTimeout(_) => "Upstream API error".to_string(),
            VerifyError::Unexpected(_) => "Internal server error".to_string(),
        }
    }
}

impl From<serde_json::Error> for VerifyError {
    fn from(err: serde_json::Error) -> Self {
        VerifyError::InvalidJson(err.to_string())
    }
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

/// JSON error body: `{error, code, message?, hasApiKey?, hasAppId?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "hasApiKey", skip_serializing_if = "Option::is_none")]
    pub has_api_key: Option<bool>,
    #[serde(rename = "hasAppId", skip_serializing_if = "Option::is_none")]
    pub has_app_id: Option<bool>,
}

impl ErrorBody {
    pub fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            message: None,
            has_api_key: None,
            has_app_id: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_credential_flags(mut self, has_api_key: bool, has_app_id: bool) -> Self {
        self.has_api_key = Some(has_api_key);
        self.has_app_id = Some(has_app_id);
        self
    }
}

/// Result type alias for verification operations
pub type Result<T> = std::result::Result<T, VerifyError>;
