//! Agent module - orchestration and conversation management
//!
//! Contains the tool-use loop that coordinates model calls and tool execution.

pub mod conversation;
pub mod loop_state;
pub mod orchestrator;

pub use conversation::Conversation;
pub use loop_state::{AgentLoopState, LoopPhase};
pub use orchestrator::{WeatherAgent, SYSTEM_PROMPT};
