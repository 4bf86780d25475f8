//! Best-of-N match controller.
//!
//! Owns the player assignment, the match configuration, the scorer and the
//! current `Game`. Every game-ending transition is forwarded to the scorer
//! here, so outcomes can only enter the log through this type.

use serde::Serialize;

use crate::arbiter::{Game, MoveApplied};
use crate::config::MatchConfig;
use crate::error::{ArenaError, MoveRejected};
use crate::game_data::{GameOutcome, GameResult, GameStatus, LastMove, MoveRecord, Side};
use crate::pgn;
use crate::players::PlayerIdentity;
use crate::scorer::MatchScore;

/// What `start` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Game with this index is now being played.
    Started(u32),
    /// The previous match was complete; a fresh one is waiting for players.
    MatchReset,
}

#[derive(Debug, Clone)]
pub struct ArenaMatch {
    config: MatchConfig,
    players: [Option<PlayerIdentity>; 2],
    allow_mirror: bool,
    score: MatchScore,
    game: Game,
}

impl ArenaMatch {
    pub fn new(config: MatchConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            config,
            players: [None, None],
            allow_mirror: false,
            score: MatchScore::new(config.games),
            game: Game::new(1, placeholder_names(), &config),
        })
    }

    /// Create a match with both sides resolved from catalog ids.
    pub fn with_players(
        config: MatchConfig,
        white: PlayerIdentity,
        black: PlayerIdentity,
        allow_mirror: bool,
    ) -> Result<Self, ArenaError> {
        let mut arena = Self::new(config)?;
        arena.assign_players(white, black, allow_mirror)?;
        Ok(arena)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub(crate) fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn score(&self) -> &MatchScore {
        &self.score
    }

    pub fn player(&self, side: Side) -> Option<&PlayerIdentity> {
        self.players[side.index()].as_ref()
    }

    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    fn first_game_pending(&self) -> bool {
        self.score.outcomes().is_empty() && self.game.status() == GameStatus::Idle
    }

    /// Replace the configuration. Only allowed before the first game begins.
    pub fn set_config(&mut self, config: MatchConfig) -> Result<(), ArenaError> {
        config.validate()?;
        if !self.first_game_pending() {
            return Err(ArenaError::InvalidState {
                action: "change the match configuration",
                status: self.game.status(),
            });
        }
        self.config = config;
        self.score = MatchScore::new(config.games);
        self.replace_game(Game::new(1, self.names(), &config));
        Ok(())
    }

    /// Seat both players. The same AI backend on both sides needs `allow_mirror`.
    pub fn assign_players(
        &mut self,
        white: PlayerIdentity,
        black: PlayerIdentity,
        allow_mirror: bool,
    ) -> Result<(), ArenaError> {
        match self.game.status() {
            GameStatus::Idle | GameStatus::Finished => {}
            status => {
                return Err(ArenaError::InvalidState {
                    action: "change players",
                    status,
                })
            }
        }
        if let (Some(w), Some(b)) = (white.ai_id(), black.ai_id()) {
            if w == b && !allow_mirror {
                return Err(ArenaError::DuplicatePlayer(white.display_name().to_string()));
            }
        }
        tracing::info!(
            white = %white.display_name(),
            black = %black.display_name(),
            "Players assigned"
        );
        self.players = [Some(white), Some(black)];
        self.allow_mirror = allow_mirror;
        let names = self.names();
        self.game.set_names(names);
        Ok(())
    }

    fn names(&self) -> [String; 2] {
        let fallback = placeholder_names();
        [Side::White, Side::Black].map(|side| {
            self.player(side)
                .map(|p| p.display_name().to_string())
                .unwrap_or_else(|| fallback[side.index()].clone())
        })
    }

    /// Both sides assigned and the current game not yet started.
    pub fn can_start(&self) -> bool {
        self.players.iter().all(Option::is_some) && self.game.status() == GameStatus::Idle
    }

    pub fn start(&mut self) -> Result<StartOutcome, ArenaError> {
        match self.game.status() {
            GameStatus::Idle => {
                if !self.can_start() {
                    return Err(ArenaError::PlayersNotAssigned);
                }
                self.game.start();
                Ok(StartOutcome::Started(self.game.number()))
            }
            GameStatus::Finished if !self.score.is_complete() => {
                if self.players.iter().any(Option::is_none) {
                    return Err(ArenaError::PlayersNotAssigned);
                }
                let number = self.score.next_game_number();
                self.replace_game(Game::new(number, self.names(), &self.config));
                self.game.start();
                Ok(StartOutcome::Started(number))
            }
            GameStatus::Finished => {
                tracing::info!(winner = ?self.score.winner(), "Match complete, resetting");
                self.score = MatchScore::new(self.config.games);
                self.players = [None, None];
                self.allow_mirror = false;
                self.replace_game(Game::new(1, placeholder_names(), &self.config));
                Ok(StartOutcome::MatchReset)
            }
            status => Err(ArenaError::InvalidState {
                action: "start",
                status,
            }),
        }
    }

    fn replace_game(&mut self, mut game: Game) {
        game.succeed(&self.game);
        self.game = game;
    }

    fn check(&self, ok: bool, action: &'static str) -> Result<(), ArenaError> {
        if ok {
            Ok(())
        } else {
            Err(ArenaError::InvalidState {
                action,
                status: self.game.status(),
            })
        }
    }

    pub fn pause(&mut self) -> Result<(), ArenaError> {
        let ok = self.game.pause();
        self.check(ok, "pause")
    }

    pub fn resume(&mut self) -> Result<(), ArenaError> {
        let ok = self.game.resume();
        self.check(ok, "resume")
    }

    /// Resign for `side`, or for the side to move when none is given.
    pub fn resign(&mut self, side: Option<Side>) -> Result<GameOutcome, ArenaError> {
        let side = side.unwrap_or_else(|| self.game.turn());
        let outcome = self.game.resign(side);
        self.record(outcome)
            .ok_or_else(|| self.invalid("resign"))
    }

    pub fn offer_draw(&mut self, side: Option<Side>) -> Result<(), ArenaError> {
        let side = side.unwrap_or_else(|| self.game.turn());
        let ok = self.game.offer_draw(side);
        self.check(ok, "offer a draw")
    }

    pub fn accept_draw(&mut self) -> Result<GameOutcome, ArenaError> {
        let outcome = self.game.accept_draw();
        self.record(outcome)
            .ok_or_else(|| self.invalid("accept a draw"))
    }

    pub fn reject_draw(&mut self) -> Result<(), ArenaError> {
        let ok = self.game.reject_draw();
        self.check(ok, "reject a draw")
    }

    /// Out-of-band timeout. A no-op unless the game is being played.
    pub fn timeout(&mut self, side: Side) -> Option<GameOutcome> {
        let outcome = self.game.timeout(side);
        self.record(outcome)
    }

    /// One-second clock tick.
    pub fn tick(&mut self) -> Option<GameOutcome> {
        let outcome = self.game.tick();
        self.record(outcome)
    }

    pub fn apply_move(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Result<MoveApplied, MoveRejected> {
        let applied = self.game.apply_move(from, to, promotion)?;
        self.record(applied.outcome.clone());
        Ok(applied)
    }

    /// A move from the board UI; refused while an AI side is to move.
    pub fn human_move(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Result<MoveApplied, MoveRejected> {
        if self.game.status() != GameStatus::Playing {
            return Err(MoveRejected::NotPlaying);
        }
        let side = self.game.turn();
        if !self.player(side).is_some_and(PlayerIdentity::is_human) {
            return Err(MoveRejected::NotHumanTurn(side));
        }
        self.apply_move(from, to, promotion)
    }

    /// Catalog id of the AI that should move now, if any.
    pub fn ai_to_move(&self) -> Option<&'static str> {
        if self.game.status() != GameStatus::Playing {
            return None;
        }
        self.player(self.game.turn()).and_then(PlayerIdentity::ai_id)
    }

    fn record(&mut self, outcome: Option<GameOutcome>) -> Option<GameOutcome> {
        let outcome = outcome?;
        self.score.record_outcome(outcome.clone());
        if self.score.is_complete() {
            tracing::info!(
                white = self.score.score(Side::White),
                black = self.score.score(Side::Black),
                winner = ?self.score.winner(),
                "Match finished"
            );
        }
        Some(outcome)
    }

    fn invalid(&self, action: &'static str) -> ArenaError {
        ArenaError::InvalidState {
            action,
            status: self.game.status(),
        }
    }

    pub fn pgn(&self) -> String {
        pgn::write_game(&self.game)
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let game = &self.game;
        let clocks = game.clocks();
        MatchSnapshot {
            status: game.status(),
            game_number: game.number(),
            config: self.config,
            fen: game.fen(),
            turn: game.turn(),
            in_check: game.is_check(),
            white_moves: game.moves(Side::White).to_vec(),
            black_moves: game.moves(Side::Black).to_vec(),
            move_number: game.move_number(),
            clocks: ClockSnapshot {
                white: clocks.clock(Side::White).remaining(),
                black: clocks.clock(Side::Black).remaining(),
                active: clocks.armed_side(),
            },
            draw_offer: game.draw_offer(),
            thinking: game.thinking(),
            last_move: game.last_move().cloned(),
            players: PlayersSnapshot {
                white: self.players[0].clone(),
                black: self.players[1].clone(),
            },
            results: self.score.outcomes().to_vec(),
            scores: ScoreSnapshot {
                white: self.score.score(Side::White),
                black: self.score.score(Side::Black),
            },
            match_complete: self.score.is_complete(),
            winner: self.score.winner(),
        }
    }
}

fn placeholder_names() -> [String; 2] {
    ["White".to_string(), "Black".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockSnapshot {
    pub white: u32,
    pub black: u32,
    pub active: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayersSnapshot {
    pub white: Option<PlayerIdentity>,
    pub black: Option<PlayerIdentity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSnapshot {
    pub white: f64,
    pub black: f64,
}

/// Everything a board UI needs to render the match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub status: GameStatus,
    pub game_number: u32,
    pub config: MatchConfig,
    pub fen: String,
    pub turn: Side,
    pub in_check: bool,
    pub white_moves: Vec<MoveRecord>,
    pub black_moves: Vec<MoveRecord>,
    pub move_number: u32,
    pub clocks: ClockSnapshot,
    pub draw_offer: Option<Side>,
    pub thinking: Option<Side>,
    pub last_move: Option<LastMove>,
    pub players: PlayersSnapshot,
    pub results: Vec<GameOutcome>,
    pub scores: ScoreSnapshot,
    pub match_complete: bool,
    pub winner: Option<GameResult>,
}
