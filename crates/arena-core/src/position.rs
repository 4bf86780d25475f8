//! Position tracking on top of shakmaty.
//!
//! Wraps a `Chess` position with the bookkeeping shakmaty leaves to the caller
//! (position repetition counts) and exposes moves in UCI coordinate form.

use std::collections::HashMap;

use shakmaty::{fen::Fen, san::San, CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::error::{ArenaError, MoveRejected};
use crate::game_data::Side;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Terminal-condition flags observed right after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalFlags {
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub threefold_repetition: bool,
    pub insufficient_material: bool,
    pub fifty_move_rule: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub san: String,
    pub uci: String,
    pub flags: TerminalFlags,
}

#[derive(Debug, Clone)]
pub struct PositionTracker {
    pos: Chess,
    /// Normalized FEN -> times the position has occurred.
    seen: HashMap<String, u32>,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::with_position(Chess::default())
    }
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, ArenaError> {
        let setup: Fen = fen
            .trim()
            .parse()
            .map_err(|e| ArenaError::InvalidFen(format!("{e}")))?;
        let pos: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| ArenaError::InvalidFen(format!("{e}")))?;
        Ok(Self::with_position(pos))
    }

    fn with_position(pos: Chess) -> Self {
        let mut tracker = Self {
            pos,
            seen: HashMap::new(),
        };
        tracker.record_occurrence();
        tracker
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Side {
        self.pos.turn().into()
    }

    pub fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    /// Legal moves for the side to move in UCI form (`e2e4`, `e7e8q`, `e1g1`).
    pub fn legal_moves(&self) -> Vec<String> {
        self.pos
            .legal_moves()
            .iter()
            .map(|m| to_uci(m))
            .collect()
    }

    pub fn flags(&self) -> TerminalFlags {
        TerminalFlags {
            in_check: self.pos.is_check(),
            checkmate: self.pos.is_checkmate(),
            stalemate: self.pos.is_stalemate(),
            threefold_repetition: self.occurrences() >= 3,
            insufficient_material: self.pos.is_insufficient_material(),
            fifty_move_rule: self.pos.halfmoves() >= 100,
        }
    }

    /// Apply a move given as origin, destination and optional promotion letter.
    ///
    /// Either the position advances and the SAN is returned, or nothing changes.
    pub fn apply(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Result<AppliedMove, MoveRejected> {
        let uci = coordinate_move(from, to, promotion)?;
        let mv = self
            .find_legal(&uci)
            .ok_or_else(|| MoveRejected::Illegal(uci.clone()))?;

        let san = San::from_move(&self.pos, mv.clone()).to_string();
        self.pos.play_unchecked(mv);
        self.record_occurrence();

        let flags = self.flags();
        let suffix = if flags.checkmate {
            "#"
        } else if flags.in_check {
            "+"
        } else {
            ""
        };

        Ok(AppliedMove {
            san: format!("{san}{suffix}"),
            uci,
            flags,
        })
    }

    fn find_legal(&self, uci: &str) -> Option<Move> {
        self.pos
            .legal_moves()
            .iter()
            .find(|m| to_uci(m) == uci)
            .cloned()
    }

    fn occurrences(&self) -> u32 {
        self.seen.get(&self.repetition_key()).copied().unwrap_or(0)
    }

    fn record_occurrence(&mut self) {
        *self.seen.entry(self.repetition_key()).or_insert(0) += 1;
    }

    /// FEN without move counters: placement, side, castling and en passant.
    fn repetition_key(&self) -> String {
        normalize_fen(&self.fen())
    }
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

fn to_uci(m: &Move) -> String {
    m.to_uci(CastlingMode::Standard).to_string()
}

/// Build a lowercase UCI string, checking only the square syntax.
fn coordinate_move(from: &str, to: &str, promotion: Option<char>) -> Result<String, MoveRejected> {
    let from = from.trim().to_ascii_lowercase();
    let to = to.trim().to_ascii_lowercase();
    if !is_square(&from) || !is_square(&to) {
        return Err(MoveRejected::Malformed(format!("{from}{to}")));
    }
    match promotion.map(|p| p.to_ascii_lowercase()) {
        None => Ok(format!("{from}{to}")),
        Some(p @ ('q' | 'r' | 'b' | 'n')) => Ok(format!("{from}{to}{p}")),
        Some(p) => Err(MoveRejected::Malformed(format!("{from}{to}{p}"))),
    }
}

fn is_square(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 2 && (b'a'..=b'h').contains(&bytes[0]) && (b'1'..=b'8').contains(&bytes[1])
}

/// Split a UCI move string into (from, to, promotion).
pub fn split_uci(uci: &str) -> Option<(&str, &str, Option<char>)> {
    if !(4..=5).contains(&uci.len()) || !uci.is_ascii() {
        return None;
    }
    let promotion = uci[4..].chars().next();
    Some((&uci[0..2], &uci[2..4], promotion))
}
