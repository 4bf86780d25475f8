//! Integration tests for the stateless move endpoint.
//!
//! Each test starts its own server on an ephemeral port, backed by a stub
//! LLM provider.

mod common;

use common::{spawn_app, starting_moves, StubReply};
use serde_json::{json, Value};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[tokio::test]
async fn test_health() {
    let app = spawn_app(StubReply::Text("e2e4")).await;
    let body = app.get_json("/health").await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_player_catalog() {
    let app = spawn_app(StubReply::Text("e2e4")).await;
    let body = app.get_json("/api/players").await;
    let players = body["players"].as_array().unwrap();
    assert_eq!(players.len(), 7);
    assert!(players
        .iter()
        .any(|p| p["id"] == "claude-3.5-sonnet" && p["provider"] == "Anthropic"));
    assert!(players.iter().all(|p| p.get("model").is_none()));
    assert_eq!(body["human"]["id"], "human");
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let app = spawn_app(StubReply::Text("e2e4")).await;
    for body in [
        json!({ "fen": START_FEN, "legalMoves": ["e2e4"] }),
        json!({ "playerId": "gpt-4o", "legalMoves": ["e2e4"] }),
        json!({ "playerId": "gpt-4o", "fen": START_FEN, "legalMoves": [] }),
    ] {
        let resp = app.post("/api/chess/move", body).await;
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Missing required fields: playerId, fen, legalMoves");
    }
}

#[tokio::test]
async fn test_unknown_player_rejected() {
    let app = spawn_app(StubReply::Text("e2e4")).await;
    let resp = app
        .post(
            "/api/chess/move",
            json!({ "playerId": "deep-blue", "fen": START_FEN, "legalMoves": ["e2e4"] }),
        )
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Unknown player: deep-blue");
}

#[tokio::test]
async fn test_each_provider_returns_the_model_move() {
    let app = spawn_app(StubReply::Text("My move is g1f3")).await;
    for player in ["gpt-4o", "gpt-5", "claude-3.5-sonnet", "gemini-2.5-pro", "grok-4", "kimi-k2", "deepseek-v3"] {
        let resp = app
            .post(
                "/api/chess/move",
                json!({
                    "playerId": player,
                    "fen": START_FEN,
                    "legalMoves": starting_moves(),
                    "moveHistory": [],
                }),
            )
            .await;
        assert_eq!(resp.status(), 200, "player {player}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["move"], "g1f3", "player {player}");
        assert!(body.get("error").is_none());
    }
}

#[tokio::test]
async fn test_invalid_reply_falls_back_to_legal_move() {
    let app = spawn_app(StubReply::Text("I think castling is best here")).await;
    let resp = app
        .post(
            "/api/chess/move",
            json!({ "playerId": "gpt-4o", "fen": START_FEN, "legalMoves": starting_moves() }),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let mv = body["move"].as_str().unwrap();
    assert!(starting_moves().contains(&mv));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_backend_failure_falls_back_with_error() {
    let app = spawn_app(StubReply::Failure).await;
    let resp = app
        .post(
            "/api/chess/move",
            json!({ "playerId": "deepseek-v3", "fen": START_FEN, "legalMoves": ["e2e4", "d2d4"] }),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(["e2e4", "d2d4"].contains(&body["move"].as_str().unwrap()));
    assert_eq!(body["error"], "API error, used random move");
}
