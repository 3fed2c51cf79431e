//! Blocking client for the Anthropic Messages API.

use crate::config::{AnthropicConfig, ConfigError};
use reqwest::blocking::Client;
use serde::Deserialize;
use slideplan_core::{Oracle, OracleError, OracleRequest};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Generation oracle backed by Anthropic's Messages API.
pub struct AnthropicOracle {
    config: AnthropicConfig,
    http: Client,
}

impl AnthropicOracle {
    /// Build a client; the configured timeout bounds every call.
    pub fn new(config: AnthropicConfig) -> Result<Self, ConfigError> {
        log::debug!("Creating Anthropic oracle: {:?}", config);
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Request body for one oracle call.
    fn build_request_body(&self, request: &OracleRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{
                "role": "user",
                "content": request.instruction,
            }],
        })
    }
}

impl Oracle for AnthropicOracle {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let url = format!("{}/v1/messages", self.config.base_url);
        log::debug!(
            "{}: requesting {} fields from {}",
            request.section_id,
            request.template,
            url
        );

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.build_request_body(request))
            .send()
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .map_err(|e| map_transport_error(e, self.config.timeout))?;
        response_text(&body)
    }
}

fn map_transport_error(error: reqwest::Error, timeout: Duration) -> OracleError {
    if error.is_timeout() {
        OracleError::Timeout(timeout)
    } else {
        OracleError::Unreachable(error.to_string())
    }
}

/// Response body of the Messages API (only the parts we read).
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Concatenated text blocks of a Messages API response body.
fn response_text(body: &str) -> Result<String, OracleError> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).map_err(|e| OracleError::InvalidResponse(e.to_string()))?;

    let text: Vec<String> = parsed
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect();

    if text.is_empty() {
        return Err(OracleError::InvalidResponse(
            "response has no text content".to_string(),
        ));
    }
    Ok(text.join("\n"))
}
