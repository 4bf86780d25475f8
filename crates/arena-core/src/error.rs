//! Arena error types

use thiserror::Error;

use crate::game_data::{GameStatus, Side};

/// Configuration and command errors raised before anything is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("Matches are played over 1, 3 or 5 games, not {0}")]
    InvalidGameCount(u32),

    #[error("Move time limit must be one of 60, 120, 180, 240 or 300 seconds, not {0}")]
    InvalidMoveTime(u32),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("A human player needs a display name")]
    MissingHumanName,

    #[error("{0} cannot play both sides")]
    DuplicatePlayer(String),

    #[error("Both players must be assigned before starting")]
    PlayersNotAssigned,

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("Cannot {action} while the game is {status:?}")]
    InvalidState {
        action: &'static str,
        status: GameStatus,
    },
}

/// Why a proposed move was refused. Rejection never changes the game.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveRejected {
    #[error("Game is not in progress")]
    NotPlaying,

    #[error("Malformed move: {0}")]
    Malformed(String),

    #[error("Illegal move: {0}")]
    Illegal(String),

    #[error("It is not a human player's turn ({0} is played by an AI)")]
    NotHumanTurn(Side),
}

/// Failure of the external move service. Always recovered locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveServiceError {
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("{0} API key not configured")]
    MissingApiKey(&'static str),

    #[error("Request error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Response(String),
}
