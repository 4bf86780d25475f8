//! Best-of-N match scoring.

use serde::Serialize;

use crate::game_data::{GameOutcome, GameResult, Side};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    games_to_play: u32,
    outcomes: Vec<GameOutcome>,
}

impl MatchScore {
    pub fn new(games_to_play: u32) -> Self {
        Self {
            games_to_play,
            outcomes: Vec::new(),
        }
    }

    pub fn record_outcome(&mut self, outcome: GameOutcome) {
        tracing::info!(
            game = outcome.game_number,
            result = ?outcome.result,
            reason = %outcome.reason,
            "Game finished"
        );
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[GameOutcome] {
        &self.outcomes
    }

    /// 1-based index of the game that will be played next.
    pub fn next_game_number(&self) -> u32 {
        self.outcomes.len() as u32 + 1
    }

    pub fn score(&self, side: Side) -> f64 {
        self.outcomes
            .iter()
            .map(|o| o.result.points_for(side))
            .sum()
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.len() as u32 == self.games_to_play
    }

    /// Match winner once every game is played; equal scores are a draw.
    pub fn winner(&self) -> Option<GameResult> {
        if !self.is_complete() {
            return None;
        }
        let white = self.score(Side::White);
        let black = self.score(Side::Black);
        Some(if white > black {
            GameResult::White
        } else if black > white {
            GameResult::Black
        } else {
            GameResult::Draw
        })
    }
}
