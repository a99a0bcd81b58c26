//! REPL integration tests
//!
//! Feeds scripted stdin to the REPL and checks what the user would see.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use weather_agent::cli::{handle_command, CommandResult};
use weather_agent::core::{ToolDefinition, Turn};
use weather_agent::llm::{GenerateOptions, LLMProvider, LLMResponse};
use weather_agent::tools::{ToolHandler, ToolRegistry};
use weather_agent::{Config, Repl, Result, WeatherAgent, WeatherAgentError};

struct CannedModel {
    replies: Mutex<VecDeque<Result<LLMResponse>>>,
}

#[async_trait]
impl LLMProvider for CannedModel {
    async fn chat_with_tools(
        &self,
        _model: &str,
        _system: &str,
        _messages: &[Turn],
        _tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LLMResponse::text("No more answers.")))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

fn agent(replies: Vec<Result<LLMResponse>>) -> WeatherAgent {
    let model = Arc::new(CannedModel {
        replies: Mutex::new(replies.into()),
    });
    // No tools are needed; an empty registry is trivially complete.
    let tools = Arc::new(ToolRegistry::new(Vec::new()));
    WeatherAgent::with_clients(Config::default(), model, tools).unwrap()
}

async fn run_session(agent: WeatherAgent, input: &str) -> (String, Repl) {
    let mut repl = Repl::with_agent(agent);
    let mut out = Vec::new();
    repl.run_with(input.as_bytes(), &mut out).await.unwrap();
    (String::from_utf8(out).unwrap(), repl)
}

#[tokio::test]
async fn test_question_then_quit() {
    let agent = agent(vec![Ok(LLMResponse::text("Sunny in Madrid."))]);

    let (out, repl) = run_session(agent, "Weather in Madrid?\nquit\n").await;

    assert!(out.contains("Weather Agent - Powered by Claude"));
    assert!(out.contains("Weather Agent: Sunny in Madrid."));
    assert!(out.trim_end().ends_with("Goodbye! Stay weather-aware!"));
    assert_eq!(repl.agent().conversation_length(), 2);
}

#[tokio::test]
async fn test_clear_resets_history() {
    let agent = agent(vec![Ok(LLMResponse::text("Cold in Oslo."))]);

    let (out, repl) = run_session(agent, "Oslo?\n  CLEAR  \n").await;

    assert!(out.contains("Conversation cleared. Starting fresh!"));
    assert_eq!(repl.agent().conversation_length(), 0);
    // EOF ends the session politely too.
    assert!(out.contains("Goodbye! Stay weather-aware!"));
}

#[tokio::test]
async fn test_errors_are_reported_and_session_continues() {
    let agent = agent(vec![
        Err(WeatherAgentError::anthropic("rate limited")),
        Ok(LLMResponse::text("Recovered.")),
    ]);

    let (out, repl) = run_session(agent, "first\n\nsecond\nexit\n").await;

    assert!(out.contains("Error: Anthropic error: rate limited"));
    assert!(out.contains("Please try again."));
    assert!(out.contains("Weather Agent: Recovered."));
    assert_eq!(repl.agent().conversation_length(), 2);
}

#[test]
fn test_reserved_words_match_whole_line_only() {
    let mut agent = agent(Vec::new());

    assert_eq!(handle_command("Quit", &mut agent), CommandResult::Exit);
    assert_eq!(handle_command("q", &mut agent), CommandResult::Exit);
    assert_eq!(handle_command("clear", &mut agent), CommandResult::Clear);
    assert_eq!(
        handle_command("clear skies tomorrow?", &mut agent),
        CommandResult::Continue("clear skies tomorrow?".to_string())
    );

    match handle_command("status", &mut agent) {
        CommandResult::Handled(text) => {
            assert!(text.contains("canned"));
            assert!(text.contains("History:      0 turns"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

/// Registering a tool the registry never declared is caught at construction.
#[test]
fn test_undeclared_handler_rejected() {
    struct Stray;

    #[async_trait]
    impl ToolHandler for Stray {
        fn name(&self) -> &str {
            "stray"
        }

        async fn call(&self, _arguments: &serde_json::Value) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
    }

    let mut registry = ToolRegistry::new(Vec::new());
    registry.register(Stray);
    assert!(registry.validate().is_err());
}
