//! Custom error types for the weather agent
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for weather agent operations
#[derive(Error, Debug)]
pub enum WeatherAgentError {
    /// Anthropic API connection, status or decoding errors
    #[error("Anthropic error: {0}")]
    Anthropic(String),

    /// Weather provider errors
    #[error("Weather provider error: {0}")]
    Weather(String),

    /// Geocoding found no match
    #[error("Location '{0}' not found")]
    LocationNotFound(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// The model kept requesting tools past the round limit
    #[error("Tool-use loop exceeded {0} rounds without a final answer")]
    LoopExceeded(usize),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required API keys are absent
    #[error("Missing required API keys: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for weather agent operations
pub type Result<T> = std::result::Result<T, WeatherAgentError>;

impl WeatherAgentError {
    /// Create an Anthropic error
    pub fn anthropic(msg: impl Into<String>) -> Self {
        Self::Anthropic(msg.into())
    }

    /// Create a weather provider error
    pub fn weather(msg: impl Into<String>) -> Self {
        Self::Weather(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_not_found_message() {
        let err = WeatherAgentError::LocationNotFound("Atlantis".into());
        assert_eq!(err.to_string(), "Location 'Atlantis' not found");
    }

    #[test]
    fn test_missing_credentials_lists_keys() {
        let err = WeatherAgentError::MissingCredentials(vec![
            "ANTHROPIC_API_KEY".into(),
            "OPENWEATHERMAP_API_KEY".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required API keys: ANTHROPIC_API_KEY, OPENWEATHERMAP_API_KEY"
        );
    }
}
