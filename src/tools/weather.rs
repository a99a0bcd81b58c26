//! Weather tools
//!
//! Declarations offered to the model and the handlers that serve them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::core::{Result, ToolDefinition, WeatherAgentError};
use crate::tools::registry::ToolHandler;
use crate::weather::{Units, WeatherProvider, MAX_FORECAST_DAYS};

pub const CURRENT_WEATHER_TOOL: &str = "get_current_weather";
pub const FORECAST_TOOL: &str = "get_forecast";

const LOCATION_DESCRIPTION: &str =
    "The city name or location (e.g., 'London', 'New York, US', 'Tokyo, Japan')";
const UNITS_DESCRIPTION: &str =
    "Temperature units: 'metric' for Celsius, 'imperial' for Fahrenheit. Defaults to metric.";

/// The fixed tool set described to the model
pub fn weather_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            CURRENT_WEATHER_TOOL,
            "Get the current weather conditions for a specific location. Returns temperature, humidity, wind speed, and weather description.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": LOCATION_DESCRIPTION
                    },
                    "units": {
                        "type": "string",
                        "enum": ["metric", "imperial"],
                        "description": UNITS_DESCRIPTION
                    }
                },
                "required": ["location"]
            }),
        ),
        ToolDefinition::new(
            FORECAST_TOOL,
            "Get the weather forecast for the next few days for a specific location. Returns daily high/low temperatures and conditions.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": LOCATION_DESCRIPTION
                    },
                    "days": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_FORECAST_DAYS,
                        "description": "Number of days to forecast (1-5). Defaults to 5."
                    },
                    "units": {
                        "type": "string",
                        "enum": ["metric", "imperial"],
                        "description": UNITS_DESCRIPTION
                    }
                },
                "required": ["location"]
            }),
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherArgs {
    location: String,
    #[serde(default)]
    units: Units,
}

#[derive(Debug, Deserialize)]
struct ForecastArgs {
    location: String,
    #[serde(default = "default_days")]
    days: Number,
    #[serde(default)]
    units: Units,
}

fn default_days() -> Number {
    Number::from(MAX_FORECAST_DAYS)
}

/// Clamp a requested forecast length to what the provider supports
pub fn clamp_days(days: i64) -> u8 {
    days.clamp(1, MAX_FORECAST_DAYS as i64) as u8
}

/// Whole days requested; fractional values are truncated
fn requested_days(days: &Number) -> i64 {
    days.as_i64()
        .or_else(|| days.as_f64().map(|d| d.trunc() as i64))
        .unwrap_or(i64::MAX)
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, arguments: &Value) -> Result<T> {
    serde_json::from_value(arguments.clone())
        .map_err(|e| WeatherAgentError::tool(format!("Invalid arguments for {}: {}", tool, e)))
}

fn require_location(tool: &str, location: &str) -> Result<()> {
    if location.trim().is_empty() {
        return Err(WeatherAgentError::tool(format!(
            "Invalid arguments for {}: location must not be empty",
            tool
        )));
    }
    Ok(())
}

/// Handler for `get_current_weather`
pub struct CurrentWeatherTool {
    provider: Arc<dyn WeatherProvider>,
}

impl CurrentWeatherTool {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ToolHandler for CurrentWeatherTool {
    fn name(&self) -> &str {
        CURRENT_WEATHER_TOOL
    }

    async fn call(&self, arguments: &Value) -> Result<Value> {
        let args: CurrentWeatherArgs = parse_args(CURRENT_WEATHER_TOOL, arguments)?;
        require_location(CURRENT_WEATHER_TOOL, &args.location)?;

        let current = self
            .provider
            .current_weather(&args.location, args.units)
            .await?;
        Ok(serde_json::to_value(current)?)
    }
}

/// Handler for `get_forecast`
pub struct ForecastTool {
    provider: Arc<dyn WeatherProvider>,
}

impl ForecastTool {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ToolHandler for ForecastTool {
    fn name(&self) -> &str {
        FORECAST_TOOL
    }

    async fn call(&self, arguments: &Value) -> Result<Value> {
        let args: ForecastArgs = parse_args(FORECAST_TOOL, arguments)?;
        require_location(FORECAST_TOOL, &args.location)?;

        let requested = requested_days(&args.days);
        let days = clamp_days(requested);
        if days as i64 != requested {
            tracing::debug!(requested = %args.days, days, "Clamped forecast length");
        }

        let forecast = self
            .provider
            .forecast(&args.location, days, args.units)
            .await?;
        Ok(serde_json::to_value(forecast)?)
    }
}
