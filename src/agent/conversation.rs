//! Conversation transcript
//!
//! Ordered, append-only list of turns. Only `clear` removes anything.

use crate::core::Turn;

/// Manages the conversation transcript
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of turns
    pub fn commit(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.turns.extend(turns);
    }

    /// All turns in order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Committed turns followed by not-yet-committed ones
    pub fn with_pending(&self, pending: &[Turn]) -> Vec<Turn> {
        let mut all = Vec::with_capacity(self.turns.len() + pending.len());
        all.extend_from_slice(&self.turns);
        all.extend_from_slice(pending);
        all
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Get turn count
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
