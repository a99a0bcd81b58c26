//! CLI commands
//!
//! Reserved words recognized at the REPL prompt. Anything else is a question
//! for the agent.

use crate::agent::WeatherAgent;

/// Result of parsing a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// History was cleared
    Clear,
}

/// Parse and handle reserved commands
///
/// Commands must be the whole line (case-insensitive); "clear skies tomorrow?"
/// is a question, not a command.
pub fn handle_command(input: &str, agent: &mut WeatherAgent) -> CommandResult {
    let input = input.trim();

    match input.to_lowercase().as_str() {
        "quit" | "exit" | "q" => CommandResult::Exit,

        "clear" => {
            agent.reset();
            CommandResult::Clear
        }

        "help" | "?" => CommandResult::Handled(help_text()),

        "status" => CommandResult::Handled(status_text(agent)),

        _ => CommandResult::Continue(input.to_string()),
    }
}

fn status_text(agent: &WeatherAgent) -> String {
    let config = agent.config();
    format!(
        "Weather Agent Status:\n\
         ─────────────────────────────\n\
         Provider:     {}\n\
         Model:        {}\n\
         Max rounds:   {}\n\
         History:      {} turns\n\
         Debug:        {}",
        agent.provider_name(),
        config.anthropic.model,
        config.agent.max_rounds,
        agent.conversation_length(),
        if config.agent.debug { "on" } else { "off" }
    )
}

/// Generate help text
fn help_text() -> String {
    r#"Weather Agent Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  quit, exit, q    End the session
  clear            Start a new conversation
  status           Show current configuration

Examples:
  - What's the weather in London?
  - Will it rain in Tokyo tomorrow?
  - Give me a 5-day forecast for New York
─────────────────────────────────────────────"#
        .to_string()
}
