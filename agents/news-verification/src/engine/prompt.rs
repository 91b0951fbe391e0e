//! SIFT prompt construction

use crate::contracts::{CredibilityRating, ValidatedRequest};

/// Build the single user message sent upstream.
///
/// Content and source are embedded verbatim. The reply is asked to be a
/// JSON object with the report fields, which `extract` then looks for.
pub fn build_prompt(request: &ValidatedRequest) -> String {
    let ratings = CredibilityRating::ALL
        .iter()
        .map(CredibilityRating::label)
        .collect::<Vec<_>>()
        .join("/");

    format!(
        r#"You are a professional fake news verification expert. Please analyze the following information using the SIFT four-step verification method:

Information: "{content}"
Source: "{source}"

Please respond in English with the following structure, providing detailed analysis for each step:

1. [Stop] Explain why we need to stop and carefully verify this information, pointing out suspicious elements.
2. [Investigate the source] Analyze the credibility of this information source, including publisher background, history, etc.
3. [Find better coverage] Suggest how to find relevant reports from other reliable media, indicate if there is multi-source verification.
4. [Trace claims to the original] Analyze how to track original statements and evidence, check if information has been distorted.
5. [Credibility Rating] Provide final credibility rating ({ratings})
6. [Final Advice] Provide clear handling recommendations.
7. [Learning Points] Summarize verification techniques learned from this case.

Please respond in JSON format with the following fields:
- sift_analysis: {{stop, investigate_source, find_coverage, trace_claims}}
- credibility_rating: string
- final_advice: string
- learning_tips: string"#,
        content = request.content,
        source = request.source_label(),
        ratings = ratings,
    )
}
