//! Contracts for the News Verification Agent
//!
//! Wire types for the inbound verification request and the outbound
//! verification report. The report shape is fixed: every field is always
//! present in a successful response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inbound request body for `POST /verify-news`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// The claim or article text to verify
    #[serde(default)]
    pub content: Option<String>,
    /// Where the claim was seen (publisher, account, URL)
    #[serde(default)]
    pub source: Option<String>,
}

impl VerificationRequest {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            source: Some(source.into()),
        }
    }
}

/// A request that passed input validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub content: String,
    pub source: String,
}

impl ValidatedRequest {
    /// Label used for the source inside prompt and fallback text.
    pub fn source_label(&self) -> &str {
        source_label(&self.source)
    }
}

/// Returns the display label for a possibly empty source.
pub fn source_label(source: &str) -> &str {
    if source.trim().is_empty() {
        "an unspecified source"
    } else {
        source
    }
}

/// Per-step output of the SIFT method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiftAnalysis {
    pub stop: String,
    pub investigate_source: String,
    pub find_coverage: String,
    pub trace_claims: String,
}

/// Verification report returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub sift_analysis: SiftAnalysis,
    /// Free-form; usually one of [`CredibilityRating::label`]
    pub credibility_rating: String,
    pub final_advice: String,
    pub learning_tips: String,
    /// Echo of the submitted claim
    pub content: String,
    /// Echo of the submitted source
    pub source: String,
}

impl VerificationReport {
    /// Overwrite the echoed input fields.
    pub fn with_input(mut self, request: &ValidatedRequest) -> Self {
        self.content = request.content.clone();
        self.source = request.source.clone();
        self
    }

    /// Known rating this report carries, if the model stayed on the list.
    pub fn rating(&self) -> Option<CredibilityRating> {
        CredibilityRating::from_label(&self.credibility_rating)
    }
}

/// Rating labels offered to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredibilityRating {
    HighlyCredible,
    GenerallyCredible,
    NeedsCaution,
    PotentiallyMisleading,
    SuspectedFake,
    ConfirmedFake,
    UnableToDetermine,
}

impl CredibilityRating {
    pub const ALL: [CredibilityRating; 7] = [
        CredibilityRating::HighlyCredible,
        CredibilityRating::GenerallyCredible,
        CredibilityRating::NeedsCaution,
        CredibilityRating::PotentiallyMisleading,
        CredibilityRating::SuspectedFake,
        CredibilityRating::ConfirmedFake,
        CredibilityRating::UnableToDetermine,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CredibilityRating::HighlyCredible => "Highly Credible",
            CredibilityRating::GenerallyCredible => "Generally Credible",
            CredibilityRating::NeedsCaution => "Needs Caution",
            CredibilityRating::PotentiallyMisleading => "Potentially Misleading",
            CredibilityRating::SuspectedFake => "Suspected Fake",
            CredibilityRating::ConfirmedFake => "Confirmed Fake",
            CredibilityRating::UnableToDetermine => "Unable to Determine",
        }
    }

    /// Snake-case form used as a metrics label
    pub fn metric_label(&self) -> &'static str {
        match self {
            CredibilityRating::HighlyCredible => "highly_credible",
            CredibilityRating::GenerallyCredible => "generally_credible",
            CredibilityRating::NeedsCaution => "needs_caution",
            CredibilityRating::PotentiallyMisleading => "potentially_misleading",
            CredibilityRating::SuspectedFake => "suspected_fake",
            CredibilityRating::ConfirmedFake => "confirmed_fake",
            CredibilityRating::UnableToDetermine => "unable_to_determine",
        }
    }

    /// Case-insensitive lookup that tolerates surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|rating| rating.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for CredibilityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_round_trips_through_label() {
        for rating in CredibilityRating::ALL {
            assert_eq!(CredibilityRating::from_label(rating.label()), Some(rating));
        }
    }

    #[test]
    fn test_rating_lookup_is_lenient() {
        assert_eq!(
            CredibilityRating::from_label("  needs caution "),
            Some(CredibilityRating::NeedsCaution)
        );
        assert_eq!(CredibilityRating::from_label("Probably fine"), None);
    }

    #[test]
    fn test_request_fields_are_optional() {
        let request: VerificationRequest = serde_json::from_str(r#"{"content":"x"}"#).unwrap();
        assert_eq!(request.content.as_deref(), Some("x"));
        assert!(request.source.is_none());
    }

    #[test]
    fn test_source_label_for_blank_source() {
        assert_eq!(source_label("   "), "an unspecified source");
        assert_eq!(source_label("Reuters"), "Reuters");
    }

    #[test]
    fn test_with_input_overwrites_echo_fields() {
        let report = VerificationReport {
            sift_analysis: SiftAnalysis {
                stop: "a".into(),
                investigate_source: "b".into(),
                find_coverage: "c".into(),
                trace_claims: "d".into(),
            },
            credibility_rating: "Needs Caution".into(),
            final_advice: "e".into(),
            learning_tips: "f".into(),
            content: "model said this".into(),
            source: "model source".into(),
        };
        let request = ValidatedRequest {
            content: "claim".into(),
            source: "blog".into(),
        };
        let report = report.with_input(&request);
        assert_eq!(report.content, "claim");
        assert_eq!(report.source, "blog");
        assert_eq!(report.rating(), Some(CredibilityRating::NeedsCaution));
    }
}
