//! Weather Agent - Conversational Weather Assistant
//!
//! A Rust weather assistant that lets Claude answer questions by calling
//! weather tools backed by OpenWeatherMap.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, error handling and tracing setup
//! - **LLM**: Model provider abstraction with the Anthropic Messages client
//! - **Weather**: Weather provider abstraction with the OpenWeatherMap client
//! - **Tools**: Tool registry and the two weather tools
//! - **Agent**: The tool-use loop and conversation management
//! - **MCP**: Stdio tool server exposing the same tools
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use weather_agent::{Config, WeatherAgent};
//!
//! #[tokio::main]
//! async fn main() -> weather_agent::Result<()> {
//!     let mut agent = WeatherAgent::from_config(Config::load()?)?;
//!
//!     let answer = agent.submit("Do I need an umbrella in Paris today?").await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod mcp;
pub mod tools;
pub mod weather;

// Re-export commonly used items
pub use agent::WeatherAgent;
pub use cli::Repl;
pub use core::{Config, Result, WeatherAgentError};
pub use mcp::McpServer;
