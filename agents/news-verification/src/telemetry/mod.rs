//! Telemetry for the News Verification Agent
//!
//! Prometheus counters and histograms for request outcomes, parse
//! fallbacks, returned ratings and upstream latency. Structured logs go
//! through `tracing`; the subscriber is installed by the binary.

pub mod metrics;

pub use metrics::VerificationMetrics;

use thiserror::Error;

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Metrics encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
