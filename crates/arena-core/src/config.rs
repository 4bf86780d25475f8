//! Match configuration, fixed once the first game of a match begins.

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;

pub const GAME_COUNTS: [u32; 3] = [1, 3, 5];
pub const MOVE_TIME_LIMITS: [u32; 5] = [60, 120, 180, 240, 300];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub games: u32,
    pub timed: bool,
    /// Per-move budget in seconds.
    pub move_time_limit: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            games: 1,
            timed: true,
            move_time_limit: 60,
        }
    }
}

impl MatchConfig {
    pub fn new(games: u32, timed: bool, move_time_limit: u32) -> Result<Self, ArenaError> {
        let config = Self {
            games,
            timed,
            move_time_limit,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ArenaError> {
        if !GAME_COUNTS.contains(&self.games) {
            return Err(ArenaError::InvalidGameCount(self.games));
        }
        if !MOVE_TIME_LIMITS.contains(&self.move_time_limit) {
            return Err(ArenaError::InvalidMoveTime(self.move_time_limit));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_supported_values() {
        for games in GAME_COUNTS {
            for limit in MOVE_TIME_LIMITS {
                assert!(MatchConfig::new(games, true, limit).is_ok());
            }
        }
    }

    #[test]
    fn test_rejects_unsupported_values() {
        assert_eq!(
            MatchConfig::new(2, true, 60),
            Err(ArenaError::InvalidGameCount(2))
        );
        assert_eq!(
            MatchConfig::new(3, false, 90),
            Err(ArenaError::InvalidMoveTime(90))
        );
    }
}
