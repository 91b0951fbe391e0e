//! Verification engine
//!
//! Linear flow: validate input, check credentials, build the SIFT prompt,
//! call the chat-completion API, normalize the reply into a report, echo
//! the inputs. The only branch is model report vs. default report.

pub mod extract;
pub mod fallback;
pub mod prompt;

pub use extract::find_json_object;
pub use fallback::default_report;
pub use prompt::build_prompt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::QianfanClient;
use crate::config::{Credentials, ServiceConfig};
use crate::contracts::{SiftAnalysis, ValidatedRequest, VerificationReport, VerificationRequest};
use crate::error::{Result, VerifyError};
use crate::telemetry::VerificationMetrics;

/// Where the report body came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOrigin {
    /// Parsed from the model reply, gaps filled from the default
    Model,
    /// Default report; the reply held no usable object
    Fallback,
}

impl ReportOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportOrigin::Model => "model",
            ReportOrigin::Fallback => "fallback",
        }
    }
}

/// Result of one verification
#[derive(Debug, Clone)]
pub struct Verification {
    pub report: VerificationReport,
    pub origin: ReportOrigin,
}

/// Stateless verification engine. Shared read-only across requests.
pub struct VerificationEngine {
    client: QianfanClient,
    credentials: Credentials,
    metrics: VerificationMetrics,
}

impl VerificationEngine {
    pub fn new(config: &ServiceConfig, metrics: VerificationMetrics) -> Result<Self> {
        Ok(Self {
            client: QianfanClient::new(config.upstream.clone())?,
            credentials: config.credentials.clone(),
            metrics,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Check required fields. `content` must be non-blank; `source` is
    /// optional and echoed as received.
    pub fn validate(request: VerificationRequest) -> Result<ValidatedRequest> {
        let content = request
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| VerifyError::invalid_input("Content is required"))?;

        Ok(ValidatedRequest {
            content,
            source: request.source.unwrap_or_default(),
        })
    }

    /// Run one verification end to end.
    pub async fn verify(&self, request: VerificationRequest) -> Result<Verification> {
        let request = Self::validate(request)?;
        let (api_key, app_id) = self.credentials.require()?;

        let prompt = build_prompt(&request);
        let completion = self.client.complete(api_key, app_id, &prompt).await?;
        self.metrics.observe_upstream(completion.elapsed.as_secs_f64());

        let verification = normalize_reply(&completion.text, &request);
        if verification.origin == ReportOrigin::Fallback {
            self.metrics.record_fallback();
        }
        self.metrics.record_rating(verification.report.rating());

        Ok(verification)
    }
}

/// Turn the model's reply into a complete report for `request`.
pub fn normalize_reply(text: &str, request: &ValidatedRequest) -> Verification {
    let parsed = find_json_object(text, |object| report_from_object(object, &request.source));

    let (report, origin) = match parsed {
        Some(report) => (report, ReportOrigin::Model),
        None => {
            tracing::warn!(
                reply_len = text.len(),
                "Model reply held no usable JSON object; using default report"
            );
            (default_report(text, &request.source), ReportOrigin::Fallback)
        }
    };

    Verification {
        report: report.with_input(request),
        origin,
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialReport {
    #[serde(default)]
    sift_analysis: Option<PartialSift>,
    #[serde(default)]
    credibility_rating: Option<String>,
    #[serde(default)]
    final_advice: Option<String>,
    #[serde(default)]
    learning_tips: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialSift {
    #[serde(default)]
    stop: Option<String>,
    #[serde(default)]
    investigate_source: Option<String>,
    #[serde(default)]
    find_coverage: Option<String>,
    #[serde(default)]
    trace_claims: Option<String>,
}

impl PartialReport {
    fn is_empty(&self) -> bool {
        self.sift_analysis.is_none()
            && self.credibility_rating.is_none()
            && self.final_advice.is_none()
            && self.learning_tips.is_none()
    }
}

/// Complete a parsed object with default values. `None` when the object
/// carries none of the report fields or has a field of the wrong type, so
/// extraction moves on to the next candidate.
fn report_from_object(object: Map<String, Value>, source: &str) -> Option<VerificationReport> {
    let partial: PartialReport = match serde_json::from_value(Value::Object(object)) {
        Ok(partial) => partial,
        Err(e) => {
            tracing::debug!(error = %e, "Candidate object does not match the report shape");
            return None;
        }
    };
    if partial.is_empty() {
        return None;
    }

    let defaults = default_report("", source);
    let sift = partial.sift_analysis.unwrap_or_default();

    Some(VerificationReport {
        sift_analysis: SiftAnalysis {
            stop: or_default(sift.stop, defaults.sift_analysis.stop),
            investigate_source: or_default(
                sift.investigate_source,
                defaults.sift_analysis.investigate_source,
            ),
            find_coverage: or_default(sift.find_coverage, defaults.sift_analysis.find_coverage),
            trace_claims: or_default(sift.trace_claims, defaults.sift_analysis.trace_claims),
        },
        credibility_rating: or_default(partial.credibility_rating, defaults.credibility_rating),
        final_advice: or_default(partial.final_advice, defaults.final_advice),
        learning_tips: or_default(partial.learning_tips, defaults.learning_tips),
        content: String::new(),
        source: String::new(),
    })
}

fn or_default(value: Option<String>, default: String) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(content: &str, source: &str) -> ValidatedRequest {
        ValidatedRequest {
            content: content.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_validate_requires_content() {
        let err = VerificationEngine::validate(VerificationRequest::default()).unwrap_err();
        assert_eq!(err.to_string(), "Content is required");

        let err = VerificationEngine::validate(VerificationRequest::new("   ", "src")).unwrap_err();
        assert!(matches!(err, VerifyError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_defaults_missing_source() {
        let validated = VerificationEngine::validate(VerificationRequest {
            content: Some("claim".into()),
            source: None,
        })
        .unwrap();
        assert_eq!(validated.source, "");
        assert_eq!(validated.content, "claim");
    }

    #[test]
    fn test_normalize_full_model_report() {
        let reply = r#"```json
{
  "sift_analysis": {
    "stop": "s", "investigate_source": "i", "find_coverage": "f", "trace_claims": "t"
  },
  "credibility_rating": "Suspected Fake",
  "final_advice": "advice",
  "learning_tips": "tips",
  "content": "should be overwritten"
}
```"#;
        let result = normalize_reply(reply, &request("claim", "blog"));
        assert_eq!(result.origin, ReportOrigin::Model);
        assert_eq!(result.report.credibility_rating, "Suspected Fake");
        assert_eq!(result.report.sift_analysis.trace_claims, "t");
        assert_eq!(result.report.content, "claim");
        assert_eq!(result.report.source, "blog");
    }

    #[test]
    fn test_normalize_fills_missing_fields_from_default() {
        let reply = r#"{"credibility_rating": "Highly Credible", "sift_analysis": {"stop": "ok"}}"#;
        let result = normalize_reply(reply, &request("claim", "Reuters"));
        let defaults = default_report("", "Reuters");
        assert_eq!(result.origin, ReportOrigin::Model);
        assert_eq!(result.report.credibility_rating, "Highly Credible");
        assert_eq!(result.report.sift_analysis.stop, "ok");
        assert_eq!(
            result.report.sift_analysis.investigate_source,
            defaults.sift_analysis.investigate_source
        );
        assert_eq!(result.report.final_advice, defaults.final_advice);
    }

    #[test]
    fn test_normalize_prose_uses_default_report() {
        let req = request("Vaccines cause magnetism", "AnonymousBlogXYZ");
        let result = normalize_reply("This is clearly false. Check reputable sources.", &req);
        assert_eq!(result.origin, ReportOrigin::Fallback);
        assert_eq!(
            result.report,
            default_report("", "AnonymousBlogXYZ").with_input(&req)
        );
        assert_eq!(result.report.credibility_rating, "Needs Caution");
    }

    #[test]
    fn test_normalize_wrong_types_use_default_report() {
        let result = normalize_reply(r#"{"credibility_rating": 3}"#, &request("c", "s"));
        assert_eq!(result.origin, ReportOrigin::Fallback);
    }

    #[test]
    fn test_normalize_skips_echoed_input_before_report() {
        let reply = concat!(
            r#"You asked about {"content": "claim", "source": "blog"}."#,
            "\n\n",
            r#"{"sift_analysis": {"stop": "s", "investigate_source": "i", "find_coverage": "f", "trace_claims": "t"}, "#,
            r#""credibility_rating": "Suspected Fake", "final_advice": "a", "learning_tips": "l"}"#,
        );
        let result = normalize_reply(reply, &request("claim", "blog"));
        assert_eq!(result.origin, ReportOrigin::Model);
        assert_eq!(result.report.credibility_rating, "Suspected Fake");
        assert_eq!(result.report.sift_analysis.stop, "s");
        assert_eq!(result.report.final_advice, "a");
    }

    #[test]
    fn test_normalize_unrelated_object_uses_default_report() {
        let result = normalize_reply(r#"{"answer": "yes"}"#, &request("c", "s"));
        assert_eq!(result.origin, ReportOrigin::Fallback);
    }

    proptest! {
        #[test]
        fn model_report_echoes_any_input(content in "\\PC+", source in "\\PC*") {
            let reply = serde_json::json!({
                "sift_analysis": {
                    "stop": "s", "investigate_source": "i", "find_coverage": "f", "trace_claims": "t"
                },
                "credibility_rating": "Generally Credible",
                "final_advice": "a",
                "learning_tips": "l",
                "content": "model rewrote this",
                "source": "model rewrote this"
            })
            .to_string();
            let result = normalize_reply(&format!("Result:\n{}", reply), &request(&content, &source));
            prop_assert_eq!(result.origin, ReportOrigin::Model);
            prop_assert_eq!(&result.report.content, &content);
            prop_assert_eq!(&result.report.source, &source);
            prop_assert_eq!(result.report.credibility_rating.as_str(), "Generally Credible");
        }

        #[test]
        fn prose_reply_echoes_any_input(content in "\\PC+", source in "\\PC*", prose in "[a-zA-Z .,!?]*") {
            let req = request(&content, &source);
            let result = normalize_reply(&prose, &req);
            prop_assert_eq!(result.origin, ReportOrigin::Fallback);
            prop_assert_eq!(&result.report.content, &content);
            prop_assert_eq!(&result.report.source, &source);
            prop_assert_eq!(result.report, default_report("", &source).with_input(&req));
        }
    }
}
