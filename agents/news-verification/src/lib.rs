//! News Verification Agent
//!
//! Stateless edge function that checks a claim with the SIFT method
//! (Stop, Investigate the source, Find better coverage, Trace claims to the
//! original). The claim and its source go to an LLM chat-completion API,
//! and the free-form reply is normalized into a fixed JSON report.
//!
//! # Design Principles
//! - Stateless: configuration is injected, nothing persists between requests
//! - Guaranteed shape: an unparseable model reply yields the default report
//! - Every response is JSON and carries the CORS header set

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod telemetry;

#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use config::{Credentials, ServiceConfig, UpstreamConfig};
pub use contracts::*;
pub use engine::{default_report, ReportOrigin, Verification, VerificationEngine};
pub use error::{ErrorBody, VerifyError};
pub use handler::{create_router, AppState};

/// Agent version (from Cargo.toml)
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Agent identifier
pub const AGENT_ID: &str = "news-verification-agent";
