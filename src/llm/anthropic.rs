//! Anthropic client implementation
//!
//! Async HTTP client for the Anthropic Messages API with tool use support.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::{AnthropicConfig, ANTHROPIC_API_KEY_VAR};
use crate::core::{ContentBlock, Result, ToolDefinition, Turn, WeatherAgentError};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, StopReason, TokenUsage};

/// Anthropic Messages API client
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_version: String,
    max_tokens: u32,
}

/// Messages API request
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Turn],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

/// Messages API response
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<StopReason>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

/// Error envelope returned on non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl AnthropicClient {
    /// Create a client from configuration
    pub fn from_config(config: &AnthropicConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            WeatherAgentError::MissingCredentials(vec![ANTHROPIC_API_KEY_VAR.into()])
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_version: config.api_version.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn build_request<'a>(
        &self,
        model: &'a str,
        system: &'a str,
        messages: &'a [Turn],
        tools: &'a [ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> MessagesRequest<'a> {
        let options = options.unwrap_or_default();
        MessagesRequest {
            model,
            max_tokens: options.max_tokens.unwrap_or(self.max_tokens),
            system,
            messages,
            tools,
            temperature: options.temperature,
            stop_sequences: options.stop,
        }
    }

    /// Convert an API response to LLMResponse
    fn to_llm_response(response: MessagesResponse) -> LLMResponse {
        LLMResponse {
            content: response.content,
            stop_reason: response.stop_reason,
            usage: response.usage,
            model: response.model,
        }
    }

    /// Turn a non-2xx body into a readable error
    fn status_error(status: reqwest::StatusCode, body: &str) -> WeatherAgentError {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => WeatherAgentError::anthropic(format!(
                "API error ({}): {}: {}",
                status, parsed.error.kind, parsed.error.message
            )),
            Err(_) => WeatherAgentError::anthropic(format!("API error ({}): {}", status, body)),
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicClient {
    async fn chat_with_tools(
        &self,
        model: &str,
        system: &str,
        messages: &[Turn],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = self.build_request(model, system, messages, tools, options);

        tracing::debug!(
            model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending messages request"
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    WeatherAgentError::anthropic(format!(
                        "Cannot connect to Anthropic API at {}",
                        self.base_url
                    ))
                } else if e.is_timeout() {
                    WeatherAgentError::anthropic("Request to Anthropic API timed out")
                } else {
                    WeatherAgentError::from(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherAgentError::anthropic(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            stop_reason = ?parsed.stop_reason,
            blocks = parsed.content.len(),
            "Received messages response"
        );

        Ok(Self::to_llm_response(parsed))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_client() -> AnthropicClient {
        let config = AnthropicConfig {
            api_key: Some("sk-test".into()),
            base_url: "https://api.example.com/".into(),
            ..AnthropicConfig::default()
        };
        AnthropicClient::from_config(&config).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = test_client();
        assert_eq!(client.base_url, "https://api.example.com");
        assert_eq!(client.name(), "anthropic");
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let config = AnthropicConfig {
            api_key: None,
            ..AnthropicConfig::default()
        };
        assert!(matches!(
            AnthropicClient::from_config(&config),
            Err(WeatherAgentError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let client = test_client();
        let turns = vec![Turn::user("Weather in Paris?")];
        let tools = vec![ToolDefinition::new(
            "get_current_weather",
            "Current conditions",
            json!({"type": "object"}),
        )];

        let request = client.build_request("claude-test", "Be helpful", &turns, &tools, None);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "claude-test");
        assert_eq!(value["max_tokens"], 4096);
        assert_eq!(value["system"], "Be helpful");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["tools"][0]["name"], "get_current_weather");
        assert!(value["tools"][0].get("input_schema").is_some());
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_request_omits_empty_tools() {
        let client = test_client();
        let turns = vec![Turn::user("hi")];
        let options = GenerateOptions {
            temperature: Some(0.2),
            max_tokens: Some(256),
            ..Default::default()
        };
        let request = client.build_request("m", "s", &turns, &[], Some(options));
        let value = serde_json::to_value(&request).unwrap();

        assert!(value.get("tools").is_none());
        assert_eq!(value["max_tokens"], 256);
    }

    #[test]
    fn test_response_parsing() {
        let body = json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_01", "name": "get_current_weather", "input": {"location": "London"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 40}
        });

        let parsed: MessagesResponse = serde_json::from_value(body).unwrap();
        let response = AnthropicClient::to_llm_response(parsed);

        assert!(!response.is_terminal());
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.requested_tools()[0].name, "get_current_weather");
        assert_eq!(response.usage.unwrap().input_tokens, 120);
    }

    #[test]
    fn test_status_error_uses_api_message() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        let err = AnthropicClient::status_error(reqwest::StatusCode::UNAUTHORIZED, body);
        let msg = err.to_string();
        assert!(msg.contains("authentication_error"));
        assert!(msg.contains("invalid x-api-key"));
    }
}
