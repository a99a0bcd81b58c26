//! Configuration management for the weather agent
//!
//! Supports environment variables, config files, and runtime overrides.
//! API keys are only ever read from the environment and never written out.
//!
//! Config file location: ~/.config/weather-agent/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, WeatherAgentError};

/// Environment variable holding the Anthropic API key
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Environment variable holding the OpenWeatherMap API key
pub const OPENWEATHERMAP_API_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";

/// Main configuration for the weather agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Anthropic model API configuration
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Anthropic Messages API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key, taken from ANTHROPIC_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Value of the anthropic-version header
    pub api_version: String,
    /// Model used for inference
    pub model: String,
    /// Maximum tokens per response
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// OpenWeatherMap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API key, taken from OPENWEATHERMAP_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Data API base URL
    pub base_url: String,
    /// Geocoding API base URL
    pub geo_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum tool-use rounds per submitted message
    /// Default: 10
    pub max_rounds: usize,
    /// Whether to emit debug logs
    pub debug: bool,
    /// Replaces the built-in system prompt when set
    pub system_prompt: Option<String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: env::var(ANTHROPIC_API_KEY_VAR).ok().filter(|k| !k.is_empty()),
            base_url: env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            api_version: "2023-06-01".to_string(),
            model: env::var("WEATHER_AGENT_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string()),
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: env::var(OPENWEATHERMAP_API_KEY_VAR)
                .ok()
                .filter(|k| !k.is_empty()),
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            geo_url: "https://api.openweathermap.org/geo/1.0".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: env::var("WEATHER_AGENT_MAX_ROUNDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            debug: env::var("WEATHER_AGENT_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            system_prompt: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weather-agent")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from .env, config file, environment and defaults
    /// Priority: CLI args > config file > env vars > defaults
    ///
    /// A missing config file means defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::load_or_default(&Self::config_file())
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_path(path)
        } else {
            let mut config = Self::default();
            config.apply_env_credentials();
            Ok(config)
        }
    }

    /// Load configuration from a TOML file
    ///
    /// Sections or keys missing from the file fall back to defaults, and the
    /// API keys are always filled from the environment.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WeatherAgentError::config("Config file not found"));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| WeatherAgentError::config(format!("Failed to read config: {}", e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| WeatherAgentError::config(format!("Failed to parse config: {}", e)))?;

        config.apply_env_credentials();
        Ok(config)
    }

    /// Fill API keys from the environment
    pub fn apply_env_credentials(&mut self) {
        if let Ok(key) = env::var(ANTHROPIC_API_KEY_VAR) {
            if !key.is_empty() {
                self.anthropic.api_key = Some(key);
            }
        }
        if let Ok(key) = env::var(OPENWEATHERMAP_API_KEY_VAR) {
            if !key.is_empty() {
                self.weather.api_key = Some(key);
            }
        }
    }

    /// Names of the required API keys that are absent
    ///
    /// The model key is only needed when the conversation loop runs; the tool
    /// server needs the weather key alone.
    pub fn missing_credentials(&self, need_model: bool) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if need_model && self.anthropic.api_key.is_none() {
            missing.push(ANTHROPIC_API_KEY_VAR);
        }
        if self.weather.api_key.is_none() {
            missing.push(OPENWEATHERMAP_API_KEY_VAR);
        }
        missing
    }

    /// Fail with `MissingCredentials` when required keys are absent
    pub fn require_credentials(&self, need_model: bool) -> Result<()> {
        let missing = self.missing_credentials(need_model);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WeatherAgentError::MissingCredentials(
                missing.into_iter().map(String::from).collect(),
            ))
        }
    }
}
