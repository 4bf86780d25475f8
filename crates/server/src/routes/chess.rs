use std::sync::Arc;

use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use arena_core::move_source::{resolve_move, MoveRequest, MoveService};
use arena_core::players;

use crate::error::AppError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessMoveBody {
    pub player_id: Option<String>,
    pub fen: Option<String>,
    pub legal_moves: Option<Vec<String>>,
    pub move_history: Option<Vec<String>>,
}

/// POST /api/chess/move
///
/// Stateless: asks the player's backend for a move in the given position.
/// Backend failures and unusable replies still answer 200 with a random
/// legal move; `error` is set when the backend itself failed.
pub async fn get_move(
    Extension(service): Extension<Arc<dyn MoveService>>,
    Json(body): Json<ChessMoveBody>,
) -> Result<Json<JsonValue>, AppError> {
    let (Some(player_id), Some(fen), Some(legal_moves)) =
        (body.player_id, body.fen, body.legal_moves)
    else {
        return Err(AppError::BadRequest(
            "Missing required fields: playerId, fen, legalMoves".to_string(),
        ));
    };
    if player_id.is_empty() || fen.is_empty() || legal_moves.is_empty() {
        return Err(AppError::BadRequest(
            "Missing required fields: playerId, fen, legalMoves".to_string(),
        ));
    }
    if players::lookup(&player_id).is_none() {
        return Err(AppError::BadRequest(format!("Unknown player: {player_id}")));
    }

    let request = MoveRequest {
        player_id,
        fen,
        legal_moves,
        move_history: body.move_history.unwrap_or_default(),
    };
    let response = service.request_move(&request).await;
    let resolved = resolve_move(
        &request.player_id,
        response,
        &request.legal_moves,
        &mut rand::rng(),
    );

    match resolved {
        Some(resolved) => Ok(Json(json!(resolved))),
        None => Err(AppError::BadRequest("No legal moves".to_string())),
    }
}
