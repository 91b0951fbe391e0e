//! Service configuration
//!
//! Configuration is assembled once at startup (see `bin/main.rs`) and
//! injected into the handler state. Nothing in the request path reads the
//! process environment.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Canonical environment variable holding the upstream API key
pub const API_KEY_ENV: &str = "BAIDU_API_KEY";
/// Canonical environment variable holding the upstream application id
pub const APP_ID_ENV: &str = "BAIDU_APP_ID";

/// Default chat-completion endpoint
pub const DEFAULT_ENDPOINT: &str = "https://qianfan.baidubce.com/v2/chat/completions";

/// Top-level configuration for the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default, skip_serializing)]
    pub credentials: Credentials,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServiceConfig {
    pub fn new(upstream: UpstreamConfig, credentials: Credentials) -> Self {
        Self {
            upstream,
            credentials,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(UpstreamConfig::default(), Credentials::default())
    }
}

fn default_max_body_bytes() -> usize {
    1024 * 1024 // 1MB
}

/// Settings for the outbound chat-completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Sent only when set; the v2 endpoint falls back to the app's default model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout_ms() -> u64 {
    25_000 // below the usual 26s serverless ceiling
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl UpstreamConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Upstream credentials. Either half may be absent; that is reported per
/// request rather than at startup.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub app_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("app_id", &self.app_id)
            .finish()
    }
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            app_id: Some(app_id.into()),
        }
    }

    /// Build from optional values, treating blank strings as absent.
    pub fn from_parts(api_key: Option<String>, app_id: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|v| !v.trim().is_empty()),
            app_id: app_id.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_app_id(&self) -> bool {
        self.app_id.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.has_api_key() && self.has_app_id()
    }

    /// Both halves, or the diagnostic error naming which is missing.
    pub fn require(&self) -> Result<(&str, &str)> {
        match (self.api_key.as_deref(), self.app_id.as_deref()) {
            (Some(key), Some(app_id)) => Ok((key, app_id)),
            _ => Err(VerifyError::MissingCredentials {
                has_api_key: self.has_api_key(),
                has_app_id: self.has_app_id(),
            }),
        }
    }
}
