pub mod chess;
pub mod health;
pub mod matches;
pub mod players;
