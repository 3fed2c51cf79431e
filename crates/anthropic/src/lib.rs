//! Anthropic Messages API backend for the slide planner's generation oracle.
//!
//! Implements [`slideplan_core::Oracle`] with a blocking HTTP client. Each
//! call is a single attempt bounded by the configured timeout.

pub mod client;
pub mod config;

pub use client::AnthropicOracle;
pub use config::{AnthropicConfig, ConfigError};
