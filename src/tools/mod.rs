//! Tools module - tool implementations for the agent
//!
//! Contains the weather tools and the registry that dispatches to them.

pub mod registry;
pub mod weather;

pub use registry::{ToolHandler, ToolRegistry};
pub use weather::{weather_tool_definitions, CURRENT_WEATHER_TOOL, FORECAST_TOOL};
