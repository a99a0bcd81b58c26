//! Core module - shared infrastructure for the weather agent
//!
//! This module contains foundational types, configuration, error handling
//! and log setup used throughout the application.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::Config;
pub use error::{Result, WeatherAgentError};
pub use types::*;
