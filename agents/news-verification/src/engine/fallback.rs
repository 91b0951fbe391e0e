//! Deterministic default report
//!
//! Used when the model reply holds no usable JSON object, and to fill any
//! report field the model left out.

use crate::contracts::{source_label, CredibilityRating, SiftAnalysis, VerificationReport};

const STOP: &str = "Based on AI analysis, this information contains multiple elements that require verification. It is recommended to stop sharing and conduct further verification.";
const FIND_COVERAGE: &str = "It is recommended to search for relevant reports through authoritative news media and official channels for comparative verification.";
const TRACE_CLAIMS: &str = "Need to track the original source of the information and check if it has been modified or distorted.";
const FINAL_ADVICE: &str = "Do not easily believe or share this information. It is recommended to verify through multiple reliable channels.";
const LEARNING_TIPS: &str = "When encountering suspicious information, first stop and think, then verify from multiple perspectives.";

/// Build the default report for `source`.
///
/// `model_text` is accepted so callers can pass the reply they failed to
/// parse; it does not influence the output. The echo fields are left empty
/// for the caller to fill.
pub fn default_report(model_text: &str, source: &str) -> VerificationReport {
    tracing::debug!(reply_len = model_text.len(), "Building default report");

    VerificationReport {
        sift_analysis: SiftAnalysis {
            stop: STOP.to_string(),
            investigate_source: format!(
                "The credibility and background of \"{}\" need further investigation.",
                source_label(source)
            ),
            find_coverage: FIND_COVERAGE.to_string(),
            trace_claims: TRACE_CLAIMS.to_string(),
        },
        credibility_rating: CredibilityRating::NeedsCaution.label().to_string(),
        final_advice: FINAL_ADVICE.to_string(),
        learning_tips: LEARNING_TIPS.to_string(),
        content: String::new(),
        source: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_report_rating_and_source() {
        let report = default_report("plain prose", "AnonymousBlogXYZ");
        assert_eq!(report.credibility_rating, "Needs Caution");
        assert!(report
            .sift_analysis
            .investigate_source
            .contains("AnonymousBlogXYZ"));
        assert_eq!(report.final_advice, FINAL_ADVICE);
        assert_eq!(report.learning_tips, LEARNING_TIPS);
    }

    #[test]
    fn test_default_report_blank_source() {
        let report = default_report("", "");
        assert_eq!(
            report.sift_analysis.investigate_source,
            "The credibility and background of \"an unspecified source\" need further investigation."
        );
    }

    proptest! {
        #[test]
        fn default_report_depends_only_on_source(a in ".*", b in ".*", source in ".*") {
            prop_assert_eq!(default_report(&a, &source), default_report(&b, &source));
        }
    }
}
