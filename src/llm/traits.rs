//! LLM Provider trait for abstracting the model backend
//!
//! The conversation loop only talks to `dyn LLMProvider`, so tests and
//! alternative backends can stand in for the Anthropic client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{ContentBlock, Result, ToolCall, ToolDefinition, Turn};

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    #[serde(other)]
    Other,
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Content blocks of the response, in model order
    pub content: Vec<ContentBlock>,
    /// Reported stop reason
    pub stop_reason: Option<StopReason>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl LLMResponse {
    /// A terminal response carrying only text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            stop_reason: Some(StopReason::EndTurn),
            usage: None,
            model: String::new(),
        }
    }

    /// A non-terminal response requesting the given tool calls
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            content: calls
                .into_iter()
                .map(|call| ContentBlock::ToolUse {
                    id: call.id,
                    name: call.name,
                    input: call.arguments,
                })
                .collect(),
            stop_reason: Some(StopReason::ToolUse),
            usage: None,
            model: String::new(),
        }
    }

    /// Tool requests in the response, in order
    pub fn requested_tools(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some(ToolCall::new(id, name, input.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// A response is terminal when it requests no tools
    pub fn is_terminal(&self) -> bool {
        !self
            .content
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }

    /// Concatenation of all text blocks
    pub fn final_text(&self) -> String {
        self.content.iter().filter_map(ContentBlock::as_text).collect()
    }

    /// Fold the response into an assistant turn
    pub fn into_turn(self) -> Turn {
        Turn::assistant(self.content)
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Options for LLM generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 1.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a response to the transcript with tool definitions available
    async fn chat_with_tools(
        &self,
        model: &str,
        system: &str,
        messages: &[Turn],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}
