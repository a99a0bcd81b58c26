//! Weather Agent - Conversational Weather Assistant
//!
//! Main entry point for the CLI application.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use weather_agent::core::telemetry::init_tracing;
use weather_agent::tools::ToolRegistry;
use weather_agent::weather::OpenWeatherClient;
use weather_agent::{Config, McpServer, Repl, WeatherAgent};

/// Weather Agent - ask Claude about the weather
#[derive(Parser, Debug)]
#[command(name = "weather-agent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Claude model to use
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum tool rounds per question
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the weather tools over MCP on stdio
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load()?;

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.anthropic.model = model.clone();
    }

    if let Some(max_rounds) = args.max_rounds {
        config.agent.max_rounds = max_rounds;
    }

    if args.debug {
        config.agent.debug = true;
    }

    init_tracing(config.agent.debug);

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let serving = matches!(args.command, Some(Command::Serve));
    let missing = config.missing_credentials(!serving);
    if !missing.is_empty() {
        eprintln!("Error: Missing required API keys: {}", missing.join(", "));
        eprintln!("\nSet them in your environment or in a .env file:");
        for name in &missing {
            eprintln!("  {}=your_key_here", name);
        }
        std::process::exit(1);
    }

    // Tool server mode
    if serving {
        let weather = Arc::new(OpenWeatherClient::from_config(&config.weather)?);
        let registry = Arc::new(ToolRegistry::weather(weather)?);
        McpServer::new(registry).run_stdio().await?;
        return Ok(());
    }

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let mut agent = WeatherAgent::from_config(config)?;

        let response = agent.submit(&prompt).await?;
        println!("{}", response);
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config)?;
    repl.run().await?;

    Ok(())
}
