//! OpenWeatherMap client
//!
//! Resolves locations with the geocoding API, then fetches current conditions
//! or the 3-hourly forecast and condenses it into daily summaries.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Number;
use std::time::Duration;

use crate::core::config::{WeatherConfig, OPENWEATHERMAP_API_KEY_VAR};
use crate::core::{Result, WeatherAgentError};
use crate::weather::{CurrentWeather, DailyForecast, Forecast, Units, WeatherProvider};

/// OpenWeatherMap API client
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    geo_url: String,
    api_key: String,
}

/// Geocoding match
#[derive(Debug, Deserialize)]
struct GeoMatch {
    lat: f64,
    lon: f64,
    #[serde(default)]
    name: Option<String>,
}

/// A resolved location
#[derive(Debug, Clone, PartialEq)]
struct Place {
    lat: f64,
    lon: f64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: Number,
    #[serde(default)]
    feels_like: Option<Number>,
    humidity: Number,
    #[serde(default)]
    pressure: Option<Number>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: Number,
}

/// `/weather` response
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainReadings,
    weather: Vec<Condition>,
    wind: Wind,
}

/// One 3-hour slot of a `/forecast` response
#[derive(Debug, Deserialize)]
struct ForecastSlot {
    dt_txt: String,
    main: MainReadings,
    weather: Vec<Condition>,
}

/// `/forecast` response
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastSlot>,
}

/// Readings collected for one calendar day
#[derive(Debug, Default)]
struct DayReadings {
    temps: Vec<f64>,
    humidity: Vec<f64>,
    descriptions: Vec<String>,
}

impl OpenWeatherClient {
    /// Create a client from configuration
    pub fn from_config(config: &WeatherConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            WeatherAgentError::MissingCredentials(vec![OPENWEATHERMAP_API_KEY_VAR.into()])
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geo_url: config.geo_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// GET a JSON document, mapping transport and status failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                WeatherAgentError::weather(format!("Request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherAgentError::weather(format!(
                "OpenWeatherMap error ({}): {}",
                status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| WeatherAgentError::weather(format!("Unexpected response: {}", e)))
    }

    /// Convert a location name to coordinates
    async fn resolve(&self, location: &str) -> Result<Place> {
        let matches: Vec<GeoMatch> = self
            .get_json(
                &format!("{}/direct", self.geo_url),
                &[("q", location.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        let place = first_place(matches, location)?;
        tracing::debug!(
            location,
            resolved = %place.name,
            lat = place.lat,
            lon = place.lon,
            "Geocoded location"
        );
        Ok(place)
    }

    fn coordinate_query(place: &Place, units: Units) -> Vec<(&'static str, String)> {
        vec![
            ("lat", place.lat.to_string()),
            ("lon", place.lon.to_string()),
            ("units", units.as_str().to_string()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, location: &str, units: Units) -> Result<CurrentWeather> {
        let place = self.resolve(location).await?;
        let raw: CurrentResponse = self
            .get_json(
                &format!("{}/weather", self.base_url),
                &Self::coordinate_query(&place, units),
            )
            .await?;

        Ok(current_from_response(place.name, raw, units))
    }

    async fn forecast(&self, location: &str, days: u8, units: Units) -> Result<Forecast> {
        let place = self.resolve(location).await?;
        let raw: ForecastResponse = self
            .get_json(
                &format!("{}/forecast", self.base_url),
                &Self::coordinate_query(&place, units),
            )
            .await?;

        Ok(summarize_forecast(place.name, raw, days, units))
    }
}

/// Pick the first geocoding match, keeping the query as the name fallback
fn first_place(matches: Vec<GeoMatch>, location: &str) -> Result<Place> {
    let first = matches
        .into_iter()
        .next()
        .ok_or_else(|| WeatherAgentError::LocationNotFound(location.to_string()))?;

    Ok(Place {
        lat: first.lat,
        lon: first.lon,
        name: first.name.unwrap_or_else(|| location.to_string()),
    })
}

fn current_from_response(name: String, raw: CurrentResponse, units: Units) -> CurrentWeather {
    let temp_unit = units.temperature_suffix();
    let description = raw
        .weather
        .first()
        .map(|c| capitalize(&c.description))
        .unwrap_or_default();

    CurrentWeather {
        location: name,
        temperature: format!("{}{}", raw.main.temp, temp_unit),
        feels_like: raw
            .main
            .feels_like
            .map(|t| format!("{}{}", t, temp_unit))
            .unwrap_or_default(),
        humidity: format!("{}%", raw.main.humidity),
        description,
        wind_speed: format!("{} {}", raw.wind.speed, units.speed_suffix()),
        pressure: raw
            .main
            .pressure
            .map(|p| format!("{} hPa", p))
            .unwrap_or_default(),
    }
}

/// Group 3-hour slots by calendar date and summarize the first `days` dates
fn summarize_forecast(name: String, raw: ForecastResponse, days: u8, units: Units) -> Forecast {
    let temp_unit = units.temperature_suffix();
    let mut by_date: Vec<(String, DayReadings)> = Vec::new();

    for slot in raw.list {
        let date = slot
            .dt_txt
            .split(' ')
            .next()
            .unwrap_or_default()
            .to_string();

        let index = match by_date.iter().position(|(d, _)| *d == date) {
            Some(index) => index,
            None => {
                by_date.push((date, DayReadings::default()));
                by_date.len() - 1
            }
        };

        let day = &mut by_date[index].1;
        if let Some(temp) = slot.main.temp.as_f64() {
            day.temps.push(temp);
        }
        if let Some(humidity) = slot.main.humidity.as_f64() {
            day.humidity.push(humidity);
        }
        if let Some(condition) = slot.weather.into_iter().next() {
            day.descriptions.push(condition.description);
        }
    }

    let forecast = by_date
        .into_iter()
        .take(days as usize)
        .filter(|(_, day)| !day.temps.is_empty())
        .map(|(date, day)| {
            let high = day.temps.iter().cloned().fold(f64::MIN, f64::max);
            let low = day.temps.iter().cloned().fold(f64::MAX, f64::min);
            let avg_humidity = if day.humidity.is_empty() {
                0.0
            } else {
                day.humidity.iter().sum::<f64>() / day.humidity.len() as f64
            };

            DailyForecast {
                date,
                high: format!("{:.1}{}", high, temp_unit),
                low: format!("{:.1}{}", low, temp_unit),
                avg_humidity: format!("{:.0}%", avg_humidity),
                conditions: capitalize(most_common(&day.descriptions).unwrap_or_default()),
            }
        })
        .collect();

    Forecast {
        location: name,
        forecast,
    }
}

/// Most frequent entry; ties go to the one seen first
fn most_common(items: &[String]) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for item in items {
        let count = items.iter().filter(|other| *other == item).count();
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((item.as_str(), count));
        }
    }
    best.map(|(item, _)| item)
}

/// Upper-case the first character and lower-case the rest
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
