//! AI move sourcing.
//!
//! An AI turn is split in two synchronous halves around one async call:
//! `begin_ai_turn` marks the request in flight and captures the position,
//! `complete_ai_turn` validates the reply (or substitutes a random legal
//! move) and applies it, unless the game moved on in the meantime. "Moved on"
//! is decided by the game epoch captured at request time, so a pause followed
//! by a resume still voids the request.

use std::sync::{LazyLock, Mutex, PoisonError};

use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::arbiter::MoveApplied;
use crate::arena::ArenaMatch;
use crate::error::{MoveRejected, MoveServiceError};
use crate::game_data::{GameStatus, Side};
use crate::position::split_uci;

static UCI_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([a-h][1-8])([a-h][1-8])([qrbn])?").ok());

static CHATTY_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(move:|my move is|i play|i choose)\s*").ok());

/// What the move service is asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub player_id: String,
    pub fen: String,
    pub legal_moves: Vec<String>,
    #[serde(default)]
    pub move_history: Vec<String>,
}

/// External source of AI moves. Replies are raw text; validation happens here.
#[async_trait::async_trait]
pub trait MoveService: Send + Sync {
    async fn request_move(&self, request: &MoveRequest) -> Result<String, MoveServiceError>;
}

/// Pull a legal UCI move out of free-form model output.
pub fn select_move(response: &str, legal_moves: &[String]) -> Option<String> {
    let lowered = response.to_lowercase();
    let mut candidate = lowered.trim().to_string();
    if let Some(re) = CHATTY_PREFIX.as_ref() {
        candidate = re.replace(&candidate, "").into_owned();
    }
    candidate.retain(|c| c != '\'' && c != '"');
    let first = candidate.split_whitespace().next().unwrap_or_default();

    if let Some(m) = legal_moves.iter().find(|m| m.to_lowercase() == first) {
        return Some(m.clone());
    }

    let found = UCI_PATTERN.as_ref()?.find(&lowered)?.as_str();
    legal_moves.iter().find(|m| m.as_str() == found).cloned()
}

/// The move that will actually be played for an AI turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMove {
    #[serde(rename = "move")]
    pub uci: String,
    #[serde(skip)]
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Validate a service reply, falling back to a uniformly random legal move.
/// `None` only when there is no legal move at all.
pub fn resolve_move<R: Rng + ?Sized>(
    player_id: &str,
    response: Result<String, MoveServiceError>,
    legal_moves: &[String],
    rng: &mut R,
) -> Option<ResolvedMove> {
    match response {
        Ok(text) => {
            tracing::debug!(player = player_id, response = %text, "Move service replied");
            if let Some(uci) = select_move(&text, legal_moves) {
                return Some(ResolvedMove {
                    uci,
                    fallback: false,
                    error: None,
                });
            }
            let uci = legal_moves.choose(rng)?.clone();
            tracing::warn!(
                player = player_id,
                response = %text,
                fallback = %uci,
                "Invalid move, using random fallback"
            );
            Some(ResolvedMove {
                uci,
                fallback: true,
                error: None,
            })
        }
        Err(e) => {
            let uci = legal_moves.choose(rng)?.clone();
            tracing::warn!(player = player_id, error = %e, fallback = %uci, "Move service failed");
            Some(ResolvedMove {
                uci,
                fallback: true,
                error: Some("API error, used random move".to_string()),
            })
        }
    }
}

/// An AI request that has been issued and not yet answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAiMove {
    pub side: Side,
    pub game_number: u32,
    /// Half-moves played when the request was issued.
    pub ply: usize,
    /// Game epoch at issue time. Any pause, move, finish or new game changes it.
    pub epoch: u64,
    pub request: MoveRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiTurn {
    /// The game left this turn while the request was outstanding.
    Discarded,
    Applied {
        resolved: ResolvedMove,
        applied: MoveApplied,
    },
    /// Unreachable for a resolved legal move; kept so the caller can log it.
    Rejected(MoveRejected),
    NoLegalMoves,
}

impl ArenaMatch {
    /// Start an AI turn if an AI side is to move and nothing is in flight.
    pub fn begin_ai_turn(&mut self) -> Option<PendingAiMove> {
        let player_id = self.ai_to_move()?;
        let game = self.game_mut();
        let epoch = game.begin_ai_request()?;
        let pending = PendingAiMove {
            side: game.turn(),
            game_number: game.number(),
            ply: game.history().len(),
            epoch,
            request: MoveRequest {
                player_id: player_id.to_string(),
                fen: game.fen(),
                legal_moves: game.legal_moves(),
                move_history: game.history().to_vec(),
            },
        };
        tracing::info!(
            player = player_id,
            side = %pending.side,
            game = pending.game_number,
            ply = pending.ply,
            "Requesting AI move"
        );
        Some(pending)
    }

    pub fn complete_ai_turn<R: Rng + ?Sized>(
        &mut self,
        pending: &PendingAiMove,
        response: Result<String, MoveServiceError>,
        rng: &mut R,
    ) -> AiTurn {
        let game = self.game_mut();
        game.end_ai_request(pending.epoch);
        let current = game.epoch() == pending.epoch && game.status() == GameStatus::Playing;
        if !current || self.ai_to_move() != Some(pending.request.player_id.as_str()) {
            tracing::debug!(
                game = pending.game_number,
                ply = pending.ply,
                "Discarding stale AI move"
            );
            return AiTurn::Discarded;
        }

        let request = &pending.request;
        let Some(resolved) =
            resolve_move(&request.player_id, response, &request.legal_moves, rng)
        else {
            return AiTurn::NoLegalMoves;
        };
        let Some((from, to, promotion)) = split_uci(&resolved.uci) else {
            return AiTurn::Rejected(MoveRejected::Malformed(resolved.uci.clone()));
        };
        match self.apply_move(from, to, promotion) {
            Ok(applied) => AiTurn::Applied { resolved, applied },
            Err(e) => {
                tracing::error!(error = %e, uci = %resolved.uci, "AI move rejected");
                AiTurn::Rejected(e)
            }
        }
    }
}

/// Drive one AI turn against a shared match. The lock is never held across
/// the service call. Returns `None` when no AI turn was due.
pub async fn play_ai_turn<S, R>(
    arena: &Mutex<ArenaMatch>,
    service: &S,
    rng: &mut R,
) -> Option<AiTurn>
where
    S: MoveService + ?Sized,
    R: Rng + Send + ?Sized,
{
    let pending = arena
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .begin_ai_turn()?;
    let response = service.request_move(&pending.request).await;
    let mut guard = arena.lock().unwrap_or_else(PoisonError::into_inner);
    Some(guard.complete_ai_turn(&pending, response, rng))
}
