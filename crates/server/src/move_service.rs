//! `MoveService` backed by the LLM provider clients.

use arena_core::error::MoveServiceError;
use arena_core::move_source::{MoveRequest, MoveService};
use arena_core::players;

use crate::clients::LlmClients;

pub const CHESS_SYSTEM_PROMPT: &str = "You are a chess grandmaster. Study the position and choose the strongest move.

Rules:
1. Reply with ONLY one chess move in UCI format (for example \"e2e4\", \"g1f3\", or \"e7e8q\" for a promotion).
2. The move MUST be one of the legal moves listed.
3. Do not explain the move.
4. Weigh development, king safety and tactics.

Reply with exactly one UCI move and nothing else.";

pub fn build_chess_prompt(fen: &str, legal_moves: &[String], move_history: &[String]) -> String {
    let history = if move_history.is_empty() {
        "This is the opening move.".to_string()
    } else {
        format!("Move history: {}", move_history.join(", "))
    };
    format!(
        "Current position (FEN): {fen}\n\n{history}\n\nLegal moves available: {}\n\nYour move (UCI format only):",
        legal_moves.join(", ")
    )
}

pub struct LlmMoveService {
    clients: LlmClients,
}

impl LlmMoveService {
    pub fn new(clients: LlmClients) -> Self {
        Self { clients }
    }
}

#[async_trait::async_trait]
impl MoveService for LlmMoveService {
    async fn request_move(&self, request: &MoveRequest) -> Result<String, MoveServiceError> {
        let entry = players::lookup(&request.player_id)
            .ok_or_else(|| MoveServiceError::UnknownPlayer(request.player_id.clone()))?;
        let prompt = build_chess_prompt(&request.fen, &request.legal_moves, &request.move_history);
        self.clients
            .complete(entry, CHESS_SYSTEM_PROMPT, &prompt)
            .await
    }
}
