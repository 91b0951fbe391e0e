//! Prometheus metrics for the News Verification Agent
//!
//! - `verify_requests_total` (counter) - Requests by outcome
//! - `verify_fallback_total` (counter) - Reports built from the default template
//! - `verify_ratings_total` (counter) - Credibility ratings returned
//! - `verify_upstream_duration_seconds` (histogram) - Chat-completion latency

use prometheus::{Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

use super::{Result, TelemetryError};
use crate::contracts::CredibilityRating;

const NAMESPACE: &str = "news_verification";

/// Verification metrics, registered against a private registry
#[derive(Clone)]
pub struct VerificationMetrics {
    registry: Registry,
    requests_total: CounterVec,
    fallback_total: Counter,
    ratings_total: CounterVec,
    upstream_duration_seconds: Histogram,
}

impl VerificationMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("verify_requests_total", "Total verification requests by outcome")
                .namespace(NAMESPACE),
            &["outcome"],
        )?;

        let fallback_total = Counter::with_opts(
            Opts::new(
                "verify_fallback_total",
                "Reports built from the default template because the model reply was unparseable",
            )
            .namespace(NAMESPACE),
        )?;

        let ratings_total = CounterVec::new(
            Opts::new("verify_ratings_total", "Credibility ratings returned to callers")
                .namespace(NAMESPACE),
            &["rating"],
        )?;

        let upstream_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "verify_upstream_duration_seconds",
                "Chat-completion call duration in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 20.0, 30.0]),
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(fallback_total.clone()))?;
        registry.register(Box::new(ratings_total.clone()))?;
        registry.register(Box::new(upstream_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            fallback_total,
            ratings_total,
            upstream_duration_seconds,
        })
    }

    /// Record a finished request; `outcome` is `success` or a `VerifyError::outcome` label
    pub fn record_request(&self, outcome: &str) {
        self.requests_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_fallback(&self) {
        self.fallback_total.inc();
    }

    /// Record the rating label; off-list ratings count as `other`
    pub fn record_rating(&self, rating: Option<CredibilityRating>) {
        let label = rating.map(|r| r.metric_label()).unwrap_or("other");
        self.ratings_total.with_label_values(&[label]).inc();
    }

    pub fn observe_upstream(&self, duration_secs: f64) {
        self.upstream_duration_seconds.observe(duration_secs);
    }

    #[cfg(test)]
    pub fn request_count(&self, outcome: &str) -> u64 {
        self.requests_total.with_label_values(&[outcome]).get() as u64
    }

    #[cfg(test)]
    pub fn fallback_count(&self) -> u64 {
        self.fallback_total.get() as u64
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_encode() {
        let metrics = VerificationMetrics::new().unwrap();
        metrics.record_request("success");
        metrics.record_request("success");
        metrics.record_request("invalid_input");
        metrics.record_fallback();
        metrics.record_rating(Some(CredibilityRating::NeedsCaution));
        metrics.record_rating(None);
        metrics.observe_upstream(0.8);

        assert_eq!(metrics.request_count("success"), 2);
        assert_eq!(metrics.fallback_count(), 1);

        let text = metrics.encode().unwrap();
        assert!(text.contains("news_verification_verify_requests_total{outcome=\"success\"} 2"));
        assert!(text.contains("rating=\"needs_caution\""));
        assert!(text.contains("rating=\"other\""));
        assert!(text.contains("news_verification_verify_upstream_duration_seconds_count 1"));
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let a = VerificationMetrics::new().unwrap();
        let b = VerificationMetrics::new().unwrap();
        a.record_fallback();
        assert_eq!(a.fallback_count(), 1);
        assert_eq!(b.fallback_count(), 0);
    }
}
