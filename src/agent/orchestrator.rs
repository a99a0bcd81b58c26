//! Agent orchestrator
//!
//! Main agent that coordinates the model, the weather tools and the transcript.
//! Each `submit` runs the tool-use loop: call the model, execute whatever tools
//! it asks for, feed the results back, and stop at the first response that
//! requests no tools.

use std::sync::Arc;
use std::time::Instant;

use crate::agent::conversation::Conversation;
use crate::agent::loop_state::{AgentLoopState, LoopPhase};
use crate::core::{Config, Result, Turn, WeatherAgentError};
use crate::llm::{AnthropicClient, LLMProvider, LLMResponse};
use crate::tools::ToolRegistry;
use crate::weather::OpenWeatherClient;

/// Default system instructions
pub const SYSTEM_PROMPT: &str = "You are a helpful weather assistant. You can help users with:
- Getting current weather conditions for any location
- Providing weather forecasts for the next few days
- Answering questions about weather (will it rain, should I bring an umbrella, etc.)

When users ask about weather, use the available tools to get accurate, real-time data.
Be conversational and helpful. If a user asks a vague question like \"what's the weather\",
ask them to specify a location.

Always provide weather information in a clear, easy-to-read format.
Include relevant details like temperature, conditions, and any weather advisories.
";

/// Weather assistant driving the tool-use loop
pub struct WeatherAgent {
    /// Configuration
    config: Config,
    /// Model client
    llm: Arc<dyn LLMProvider>,
    /// Tool registry
    tools: Arc<ToolRegistry>,
    /// Committed transcript
    conversation: Conversation,
    /// Loop phase
    phase: LoopPhase,
}

impl WeatherAgent {
    /// Create an agent wired to the Anthropic and OpenWeatherMap clients
    pub fn from_config(config: Config) -> Result<Self> {
        let llm = Arc::new(AnthropicClient::from_config(&config.anthropic)?);
        let weather = Arc::new(OpenWeatherClient::from_config(&config.weather)?);
        let tools = Arc::new(ToolRegistry::weather(weather)?);
        Self::with_clients(config, llm, tools)
    }

    /// Create an agent from explicit collaborators
    ///
    /// Fails when the registry's handlers do not match its declarations.
    pub fn with_clients(
        config: Config,
        llm: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Result<Self> {
        tools.validate()?;

        Ok(Self {
            config,
            llm,
            tools,
            conversation: Conversation::new(),
            phase: LoopPhase::Terminal,
        })
    }

    /// Submit a user message and run the loop to a final answer
    ///
    /// A model failure propagates unchanged. Turns of the round that failed are
    /// dropped; rounds that completed before it stay in the transcript. If the
    /// first model call fails the transcript is left exactly as it was.
    pub async fn submit(&mut self, user_input: &str) -> Result<String> {
        let mut state = AgentLoopState::new(self.config.agent.max_rounds);
        let started = Instant::now();

        tracing::info!(
            chars = user_input.len(),
            history = self.conversation.len(),
            "Submitting user message"
        );

        self.phase = LoopPhase::AwaitingModel;
        let outcome = self.run_loop(user_input, &mut state).await;
        self.phase = LoopPhase::Terminal;

        match &outcome {
            Ok(answer) => tracing::info!(
                rounds = state.round,
                tool_calls = state.tool_calls,
                answer_chars = answer.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Submit complete"
            ),
            Err(e) => tracing::warn!(
                rounds = state.round,
                error = %e,
                "Submit failed"
            ),
        }

        outcome
    }

    async fn run_loop(&mut self, user_input: &str, state: &mut AgentLoopState) -> Result<String> {
        // Turns not yet committed; flushed after every successful model call.
        let mut pending = vec![Turn::user(user_input)];

        loop {
            let response = self.call_model(&pending).await?;

            if response.is_terminal() {
                let answer = response.final_text();
                if response.content.is_empty() {
                    // The API rejects empty assistant content on later requests.
                    tracing::warn!("Model returned an empty response; not storing it");
                } else {
                    pending.push(response.into_turn());
                }
                self.conversation.commit(pending.drain(..));
                return Ok(answer);
            }

            if !state.can_start_round() {
                return Err(WeatherAgentError::LoopExceeded(state.max_rounds));
            }

            let calls = response.requested_tools();
            let preamble = response.final_text();
            if !preamble.is_empty() {
                tracing::debug!(text = %preamble, "Response carries text alongside tool requests");
            }

            tracing::debug!(
                round = state.round + 1,
                tools = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "Executing tool requests"
            );

            let results = self.tools.execute_all(&calls).await;
            let failed: Vec<&str> = results
                .iter()
                .filter(|r| r.is_error())
                .map(|r| r.tool_name.as_str())
                .collect();
            if !failed.is_empty() {
                tracing::debug!(failed = ?failed, "Tool errors handed back to the model");
            }

            pending.push(response.into_turn());
            pending.push(Turn::tool_results(results));
            self.conversation.commit(pending.drain(..));
            state.finish_round(calls.len());
        }
    }

    /// Call the model with the committed transcript plus `pending` turns
    async fn call_model(&self, pending: &[Turn]) -> Result<LLMResponse> {
        let messages = self.conversation.with_pending(pending);
        let system = self
            .config
            .agent
            .system_prompt
            .as_deref()
            .unwrap_or(SYSTEM_PROMPT);

        self.llm
            .chat_with_tools(
                &self.config.anthropic.model,
                system,
                &messages,
                self.tools.definitions(),
                None,
            )
            .await
    }

    /// Clear conversation history
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.phase = LoopPhase::Terminal;
        tracing::debug!("Conversation reset");
    }

    /// Committed transcript
    pub fn transcript(&self) -> &[Turn] {
        self.conversation.turns()
    }

    /// Current loop phase
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the model provider
    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }

    /// Get conversation length
    pub fn conversation_length(&self) -> usize {
        self.conversation.len()
    }
}
