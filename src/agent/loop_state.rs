//! Agent loop state management
//!
//! Tracks where a `submit` call is in the tool-use loop and how many tool
//! rounds it has spent.

/// Phase of the conversation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// A model call is pending or in flight
    AwaitingModel,
    /// The last submit finished, failed, or the loop was reset
    Terminal,
}

/// State of one `submit` call
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Tool rounds completed so far
    pub round: usize,
    /// Maximum allowed tool rounds
    pub max_rounds: usize,
    /// Tool calls executed across all rounds
    pub tool_calls: usize,
}

impl AgentLoopState {
    /// Create a new loop state with the given round limit
    pub fn new(max_rounds: usize) -> Self {
        Self {
            round: 0,
            max_rounds,
            tool_calls: 0,
        }
    }

    /// Whether another tool round may start
    pub fn can_start_round(&self) -> bool {
        self.round < self.max_rounds
    }

    /// Record a completed tool round
    pub fn finish_round(&mut self, tool_calls: usize) {
        self.round += 1;
        self.tool_calls += tool_calls;
    }
}
