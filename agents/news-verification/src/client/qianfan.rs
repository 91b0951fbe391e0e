//! Qianfan v2 chat-completion client
//!
//! Sends a single user message and returns the assistant text. Auth is
//! `Authorization: Bearer <key>` plus `X-Appid: <app id>`. There is no
//! retry; a failed call fails the request.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::UpstreamConfig;
use crate::error::{Result, VerifyError};

/// Header carrying the application identifier
pub const APP_ID_HEADER: &str = "X-Appid";

/// Outbound request body
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Reply envelope. Only the fields the agent reads are modelled.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    /// Some gateways answer 200 with an error object instead of choices
    #[serde(default)]
    pub error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Assistant reply plus bookkeeping for logs and metrics
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub id: Option<String>,
    pub usage: Option<Usage>,
    pub elapsed: Duration,
}

/// HTTP client for the chat-completion endpoint
#[derive(Clone)]
pub struct QianfanClient {
    client: Client,
    config: UpstreamConfig,
}

impl QianfanClient {
    /// Create a client with its own connection pool and timeout
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(format!("news-verification/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VerifyError::unexpected(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    pub fn build_request<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: self.config.model.as_deref(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Send `prompt` and return the first choice's text.
    pub async fn complete(&self, api_key: &str, app_id: &str, prompt: &str) -> Result<Completion> {
        let started = Instant::now();
        let body = self.build_request(prompt);

        tracing::info!(
            endpoint = %self.config.endpoint,
            prompt_len = prompt.len(),
            "Calling chat-completion API"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .header(APP_ID_HEADER, app_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                body = %text,
                "Chat-completion API returned an error status"
            );
            return Err(VerifyError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| VerifyError::MalformedUpstream(e.to_string()))?;

        if let Some(err) = envelope.error {
            return Err(VerifyError::MalformedUpstream(format!(
                "provider error {}: {}",
                err.code.unwrap_or_default(),
                err.message.unwrap_or_default()
            )));
        }

        let choice = envelope
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| VerifyError::MalformedUpstream("response contained no choices".into()))?;

        let completion = Completion {
            text: choice.message.content.unwrap_or_default(),
            id: envelope.id,
            usage: envelope.usage,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            completion_id = completion.id.as_deref().unwrap_or("-"),
            total_tokens = completion.usage.map(|u| u.total_tokens).unwrap_or(0),
            duration_ms = completion.elapsed.as_millis() as u64,
            "Chat-completion API call succeeded"
        );

        Ok(completion)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> VerifyError {
        if err.is_timeout() {
            VerifyError::UpstreamTimeout(self.config.timeout_ms)
        } else {
            tracing::error!(error = %err, "Chat-completion request failed in transport");
            VerifyError::unexpected("Upstream request failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let client = QianfanClient::new(UpstreamConfig::default()).unwrap();
        let body = serde_json::to_value(client.build_request("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "messages": [{"role": "user", "content": "hello"}],
                "temperature": 0.3_f32,
                "max_tokens": 2000
            })
        );
    }

    #[test]
    fn test_request_body_includes_configured_model() {
        let config = UpstreamConfig {
            model: Some("ernie-4.0-8k".to_string()),
            ..Default::default()
        };
        let client = QianfanClient::new(config).unwrap();
        let body = serde_json::to_value(client.build_request("hi")).unwrap();
        assert_eq!(body["model"], "ernie-4.0-8k");
    }

    #[test]
    fn test_response_envelope_decoding() {
        let envelope: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"as-1","object":"chat.completion","choices":[{"index":0,"message":{"role":"assistant","content":"hi"}}],"usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#,
        )
        .unwrap();
        assert_eq!(envelope.choices[0].message.content.as_deref(), Some("hi"));
        assert_eq!(envelope.usage.unwrap().total_tokens, 4);
        assert!(envelope.error.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_hides_endpoint() {
        let endpoint = "http://127.0.0.1:1/v2/chat/completions?tenant=internal";
        let client = QianfanClient::new(UpstreamConfig::default().with_endpoint(endpoint)).unwrap();
        let err = client.complete("key", "app", "prompt").await.unwrap_err();

        assert!(matches!(err, VerifyError::Unexpected(_)));
        let body = serde_json::to_string(&err.to_body()).unwrap();
        assert!(!body.contains("127.0.0.1"));
        assert!(!body.contains("tenant=internal"));
        assert!(body.contains("Upstream request failed"));
    }
}
