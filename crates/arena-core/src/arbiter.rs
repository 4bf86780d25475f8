//! The per-game state machine.
//!
//! A `Game` owns the position, both repetition windows and the clock pair.
//! Every mutation goes through one of its transition methods; rejected moves
//! and out-of-state commands leave it untouched.
//!
//! ```text
//! idle --start--> playing <--pause/resume--> paused
//! playing --move/resign/draw/timeout--> finished
//! ```

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::clock::ClockPair;
use crate::config::MatchConfig;
use crate::error::{ArenaError, MoveRejected};
use crate::game_data::{GameOutcome, GameResult, GameStatus, LastMove, MoveRecord, Side};
use crate::position::PositionTracker;
use crate::repetition::RepetitionGuard;

/// A move the arbiter accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveApplied {
    pub side: Side,
    pub uci: String,
    pub record: MoveRecord,
    /// Set when this move ended the game.
    pub outcome: Option<GameOutcome>,
}

#[derive(Debug, Clone)]
pub struct Game {
    number: u32,
    names: [String; 2],
    timed: bool,
    status: GameStatus,
    initial: PositionTracker,
    tracker: PositionTracker,
    guards: [RepetitionGuard; 2],
    clocks: ClockPair,
    moves: [Vec<MoveRecord>; 2],
    move_number: u32,
    history: Vec<String>,
    last_move: Option<LastMove>,
    draw_offer: Option<Side>,
    turn_started: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
    /// Advances on every transition that invalidates an outstanding AI request.
    epoch: u64,
    /// Epoch at which the outstanding AI request was issued.
    ai_request: Option<u64>,
    thinking: Option<Side>,
    outcome: Option<GameOutcome>,
}

impl Game {
    pub fn new(number: u32, names: [String; 2], config: &MatchConfig) -> Self {
        Self::with_tracker(number, names, config, PositionTracker::new())
    }

    /// A game that starts from an arbitrary position instead of the initial one.
    pub fn from_fen(
        number: u32,
        names: [String; 2],
        config: &MatchConfig,
        fen: &str,
    ) -> Result<Self, ArenaError> {
        Ok(Self::with_tracker(
            number,
            names,
            config,
            PositionTracker::from_fen(fen)?,
        ))
    }

    fn with_tracker(
        number: u32,
        names: [String; 2],
        config: &MatchConfig,
        tracker: PositionTracker,
    ) -> Self {
        Self {
            number,
            names,
            timed: config.timed,
            status: GameStatus::Idle,
            initial: tracker.clone(),
            tracker,
            guards: [RepetitionGuard::new(), RepetitionGuard::new()],
            clocks: ClockPair::new(config.move_time_limit),
            moves: [Vec::new(), Vec::new()],
            move_number: 1,
            history: Vec::new(),
            last_move: None,
            draw_offer: None,
            turn_started: None,
            started_at: None,
            epoch: 0,
            ai_request: None,
            thinking: None,
            outcome: None,
        }
    }

    // ---- Accessors ----

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self, side: Side) -> &str {
        &self.names[side.index()]
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn turn(&self) -> Side {
        self.tracker.turn()
    }

    pub fn fen(&self) -> String {
        self.tracker.fen()
    }

    /// Position the game starts (or restarts) from.
    pub fn initial_fen(&self) -> String {
        self.initial.fen()
    }

    pub fn is_check(&self) -> bool {
        self.tracker.is_check()
    }

    pub fn legal_moves(&self) -> Vec<String> {
        self.tracker.legal_moves()
    }

    /// Every accepted move in UCI form, in play order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn moves(&self, side: Side) -> &[MoveRecord] {
        &self.moves[side.index()]
    }

    /// Full-move counter; advances after black's half-move.
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }

    pub fn draw_offer(&self) -> Option<Side> {
        self.draw_offer
    }

    pub fn thinking(&self) -> Option<Side> {
        self.thinking
    }

    pub fn is_ai_request_in_flight(&self) -> bool {
        self.ai_request.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Take over the epoch of the game this one replaces, so tokens handed out
    /// for the old game never match the new one.
    pub(crate) fn succeed(&mut self, previous: &Game) {
        self.epoch = previous.epoch + 1;
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn clocks(&self) -> &ClockPair {
        &self.clocks
    }

    pub(crate) fn set_names(&mut self, names: [String; 2]) {
        self.names = names;
    }

    // ---- Transitions ----

    pub fn start(&mut self) -> bool {
        self.start_at(Instant::now())
    }

    pub(crate) fn start_at(&mut self, now: Instant) -> bool {
        if self.status != GameStatus::Idle {
            return false;
        }
        self.tracker = self.initial.clone();
        for guard in &mut self.guards {
            guard.reset();
        }
        self.moves = [Vec::new(), Vec::new()];
        self.move_number = 1;
        self.history.clear();
        self.last_move = None;
        self.draw_offer = None;
        self.outcome = None;
        self.ai_request = None;
        self.thinking = None;
        self.epoch += 1;
        self.started_at = Some(Utc::now());
        self.turn_started = Some(now);
        self.status = GameStatus::Playing;
        if self.timed {
            self.clocks.arm(self.turn());
        }
        tracing::info!(
            game = self.number,
            white = %self.names[0],
            black = %self.names[1],
            "Game started"
        );
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.status = GameStatus::Paused;
        self.epoch += 1;
        self.clocks.disarm_all();
        true
    }

    pub fn resume(&mut self) -> bool {
        self.resume_at(Instant::now())
    }

    /// Think-time measurement restarts; the clock gets a fresh budget.
    pub(crate) fn resume_at(&mut self, now: Instant) -> bool {
        if self.status != GameStatus::Paused {
            return false;
        }
        self.status = GameStatus::Playing;
        self.epoch += 1;
        self.turn_started = Some(now);
        if self.timed {
            self.clocks.arm(self.turn());
        }
        true
    }

    pub fn resign(&mut self, side: Side) -> Option<GameOutcome> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let reason = format!("{} Resigned", self.name(side));
        Some(self.finish(GameResult::win_for(side.opponent()), reason))
    }

    pub fn offer_draw(&mut self, side: Side) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.draw_offer = Some(side);
        true
    }

    pub fn accept_draw(&mut self) -> Option<GameOutcome> {
        if self.status != GameStatus::Playing || self.draw_offer.is_none() {
            return None;
        }
        Some(self.finish(GameResult::Draw, "Draw by Agreement".to_string()))
    }

    pub fn reject_draw(&mut self) -> bool {
        self.draw_offer.take().is_some()
    }

    /// A clock ran out. Ignored unless the game is being played.
    pub fn timeout(&mut self, side: Side) -> Option<GameOutcome> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let reason = format!("{} ran out of time", self.name(side));
        Some(self.finish(GameResult::win_for(side.opponent()), reason))
    }

    /// One second of wall time passed.
    pub fn tick(&mut self) -> Option<GameOutcome> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let expired = self.clocks.tick()?;
        self.timeout(expired)
    }

    pub fn apply_move(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Result<MoveApplied, MoveRejected> {
        self.apply_move_at(from, to, promotion, Instant::now())
    }

    pub(crate) fn apply_move_at(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<char>,
        now: Instant,
    ) -> Result<MoveApplied, MoveRejected> {
        if self.status != GameStatus::Playing {
            return Err(MoveRejected::NotPlaying);
        }

        let side = self.turn();
        let mut next = self.tracker.clone();
        let applied = next.apply(from, to, promotion)?;

        let think_time = if self.timed {
            self.turn_started
                .map(|t| now.saturating_duration_since(t).as_secs_f64().round() as u64)
        } else {
            None
        };
        let record = MoveRecord {
            number: self.move_number,
            notation: applied.san.clone(),
            time: think_time,
        };

        // Same-move forfeiture is checked before the position is committed.
        if self.guards[side.index()].push(&applied.san) {
            let reason = format!("{} made the same move 3 times", self.name(side));
            let outcome = self.finish(GameResult::win_for(side.opponent()), reason);
            return Ok(MoveApplied {
                side,
                uci: applied.uci,
                record,
                outcome: Some(outcome),
            });
        }

        self.tracker = next;
        self.epoch += 1;
        self.history.push(applied.uci.clone());
        self.last_move = Some(LastMove {
            from: applied.uci[0..2].to_string(),
            to: applied.uci[2..4].to_string(),
        });
        self.moves[side.index()].push(record.clone());
        if side == Side::Black {
            self.move_number += 1;
        }

        if self.timed {
            self.clocks.arm(side.opponent());
            self.turn_started = Some(now);
        }

        let flags = applied.flags;
        let terminal = if flags.checkmate {
            Some((GameResult::win_for(side), "Checkmate"))
        } else if flags.stalemate {
            Some((GameResult::Draw, "Stalemate"))
        } else if flags.threefold_repetition {
            Some((GameResult::Draw, "Threefold Repetition"))
        } else if flags.insufficient_material {
            Some((GameResult::Draw, "Insufficient Material"))
        } else if flags.fifty_move_rule {
            Some((GameResult::Draw, "Draw (50-move rule)"))
        } else {
            None
        };
        let outcome = terminal.map(|(result, reason)| self.finish(result, reason.to_string()));

        tracing::debug!(game = self.number, %side, san = %record.notation, "Move applied");

        Ok(MoveApplied {
            side,
            uci: applied.uci,
            record,
            outcome,
        })
    }

    // ---- AI request bookkeeping ----

    /// Mark an AI request as outstanding and return its epoch token.
    /// `None` if one already is or the game is not being played.
    pub fn begin_ai_request(&mut self) -> Option<u64> {
        if self.status != GameStatus::Playing || self.ai_request.is_some() {
            return None;
        }
        self.ai_request = Some(self.epoch);
        self.thinking = Some(self.turn());
        Some(self.epoch)
    }

    /// Clear the in-flight marker if it belongs to the request issued at `epoch`.
    pub fn end_ai_request(&mut self, epoch: u64) -> bool {
        if self.ai_request != Some(epoch) {
            return false;
        }
        self.ai_request = None;
        self.thinking = None;
        true
    }

    fn finish(&mut self, result: GameResult, reason: String) -> GameOutcome {
        let outcome = GameOutcome {
            game_number: self.number,
            result,
            reason,
        };
        self.status = GameStatus::Finished;
        self.clocks.disarm_all();
        self.draw_offer = None;
        self.ai_request = None;
        self.thinking = None;
        self.epoch += 1;
        self.outcome = Some(outcome.clone());
        outcome
    }
}
