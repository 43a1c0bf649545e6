//! Bounded conversation context.
//!
//! Keeps the last few turns of a session for the model prompt. Oldest turns
//! are evicted first.

use std::collections::VecDeque;

use ambassador_core::ConversationTurn;

/// Three user/assistant exchanges.
pub const DEFAULT_CONTEXT_TURNS: usize = 6;

#[derive(Debug, Clone)]
pub struct ConversationContext {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_TURNS)
    }
}

impl ConversationContext {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        if self.capacity == 0 {
            return;
        }
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// `USER: ...` / `BOT: ...` lines, oldest first. Lazy and restartable:
    /// clone the iterator to walk it again.
    pub fn render_for_prompt(&self) -> impl Iterator<Item = String> + Clone + '_ {
        self.turns.iter().map(ConversationTurn::prompt_line)
    }
}
