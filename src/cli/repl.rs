//! Interactive REPL for the weather agent
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::agent::WeatherAgent;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

const FAREWELL: &str = "Goodbye! Stay weather-aware!";

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: WeatherAgent,
}

impl Repl {
    /// Create a REPL with the production clients
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            agent: WeatherAgent::from_config(config)?,
        })
    }

    /// Create a REPL around an existing agent
    pub fn with_agent(agent: WeatherAgent) -> Self {
        Self { agent }
    }

    /// Get the agent
    pub fn agent(&self) -> &WeatherAgent {
        &self.agent
    }

    /// Run the REPL on stdin/stdout
    pub async fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock()).await
    }

    /// Run the REPL over arbitrary input and output
    pub async fn run_with<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        self.print_banner(&mut out)?;

        loop {
            write!(out, "\nYou: ")?;
            out.flush()?;

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    writeln!(out, "\n\n{}", FAREWELL)?;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read input");
                    writeln!(out, "\nError reading input: {}", e)?;
                    continue;
                }
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match handle_command(line, &mut self.agent) {
                CommandResult::Exit => {
                    writeln!(out, "\n{}", FAREWELL)?;
                    break;
                }
                CommandResult::Clear => {
                    writeln!(out, "\nConversation cleared. Starting fresh!")?;
                }
                CommandResult::Handled(output) => {
                    writeln!(out, "\n{}", output)?;
                }
                CommandResult::Continue(question) => {
                    write!(out, "\nWeather Agent: ")?;
                    out.flush()?;

                    match self.agent.submit(&question).await {
                        Ok(answer) => writeln!(out, "{}", answer)?,
                        Err(e) => {
                            writeln!(out, "\nError: {}", e)?;
                            writeln!(out, "Please try again.")?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner<W: Write>(&self, out: &mut W) -> Result<()> {
        let rule = "=".repeat(50);
        writeln!(out, "{}", rule)?;
        writeln!(out, "  Weather Agent - Powered by Claude")?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "\nAsk me anything about the weather!")?;
        writeln!(out, "Examples:")?;
        writeln!(out, "  - What's the weather in London?")?;
        writeln!(out, "  - Will it rain in Tokyo tomorrow?")?;
        writeln!(out, "  - Give me a 5-day forecast for New York")?;
        writeln!(out, "\nType 'quit' or 'exit' to end the session.")?;
        writeln!(out, "Type 'clear' to start a new conversation.")?;
        writeln!(out, "Model: {}", self.agent.config().anthropic.model)?;
        writeln!(out, "{}", "-".repeat(50))?;
        Ok(())
    }
}
