//! Same-move repetition guard.
//!
//! A side that plays the identical move notation three times in a row loses
//! the game. Each side keeps a window of its last three notations.

use std::collections::VecDeque;

pub const REPETITION_LIMIT: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct RepetitionGuard {
    window: VecDeque<String>,
}

impl RepetitionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notation. Returns true when the window is full and uniform.
    pub fn push(&mut self, notation: &str) -> bool {
        if self.window.len() == REPETITION_LIMIT {
            self.window.pop_front();
        }
        self.window.push_back(notation.to_string());

        self.window.len() == REPETITION_LIMIT && self.window.iter().all(|n| n == &self.window[0])
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
