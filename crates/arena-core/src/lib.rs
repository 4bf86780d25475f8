pub mod arbiter;
pub mod arena;
pub mod clock;
pub mod config;
pub mod error;
pub mod game_data;
pub mod move_source;
pub mod pgn;
pub mod players;
pub mod position;
pub mod repetition;
pub mod scorer;
