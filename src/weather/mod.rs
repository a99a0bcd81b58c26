//! Weather module - weather data providers
//!
//! The tools only see `dyn WeatherProvider`; `OpenWeatherClient` is the
//! production implementation.

pub mod openweather;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Result;

pub use openweather::OpenWeatherClient;

/// Largest forecast window the provider supports, in days
pub const MAX_FORECAST_DAYS: u8 = 5;

/// Measurement system for temperatures and speeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the provider's `units` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

/// Current conditions at a resolved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: String,
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub description: String,
    pub wind_speed: String,
    pub pressure: String,
}

/// One day of an aggregated forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: String,
    pub high: String,
    pub low: String,
    pub avg_humidity: String,
    pub conditions: String,
}

/// Multi-day forecast at a resolved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: String,
    pub forecast: Vec<DailyForecast>,
}

/// Source of weather data
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for a free-form location string
    async fn current_weather(&self, location: &str, units: Units) -> Result<CurrentWeather>;

    /// Daily forecast for the next `days` days
    async fn forecast(&self, location: &str, days: u8, units: Units) -> Result<Forecast>;
}
