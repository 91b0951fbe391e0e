//! HTTP clients for external services
//!
//! The agent talks to exactly one upstream: the LLM chat-completion API.

pub mod qianfan;

pub use qianfan::{Completion, QianfanClient};
