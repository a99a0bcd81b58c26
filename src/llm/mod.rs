//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction used by the conversation loop and the
//! Anthropic Messages API implementation.

pub mod anthropic;
pub mod traits;

pub use anthropic::AnthropicClient;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, StopReason, TokenUsage};
