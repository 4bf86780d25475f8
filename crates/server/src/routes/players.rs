use axum::Json;
use serde_json::{json, Value as JsonValue};

use arena_core::players::{HUMAN_PLAYER_ID, LLM_PLAYERS};

/// GET /api/players
pub async fn list_players() -> Json<JsonValue> {
    Json(json!({
        "players": LLM_PLAYERS,
        "human": { "id": HUMAN_PLAYER_ID, "name": "Human", "requiresName": true },
    }))
}
