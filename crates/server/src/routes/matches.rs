use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use arena_core::arena::{ArenaMatch, StartOutcome};
use arena_core::config::MatchConfig;
use arena_core::game_data::Side;
use arena_core::players::PlayerIdentity;

use crate::error::AppError;
use crate::sessions::{Session, SessionRegistry};

#[derive(Deserialize)]
pub struct PlayerSelection {
    pub id: String,
    pub name: Option<String>,
}

impl PlayerSelection {
    fn resolve(&self) -> Result<PlayerIdentity, AppError> {
        Ok(PlayerIdentity::resolve(&self.id, self.name.as_deref())?)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchBody {
    pub white: Option<PlayerSelection>,
    pub black: Option<PlayerSelection>,
    pub games: Option<u32>,
    pub timed: Option<bool>,
    pub move_time_limit: Option<u32>,
    #[serde(default)]
    pub allow_mirror: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersBody {
    pub white: PlayerSelection,
    pub black: PlayerSelection,
    #[serde(default)]
    pub allow_mirror: bool,
}

#[derive(Deserialize)]
pub struct SideQuery {
    pub side: Option<Side>,
}

#[derive(Deserialize)]
pub struct MoveBody {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

fn session(registry: &SessionRegistry, id: u64) -> Result<Arc<Session>, AppError> {
    registry
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))
}

fn view(session: &Session) -> Result<Json<JsonValue>, AppError> {
    let snapshot = session.lock().snapshot();
    let mut value = serde_json::to_value(snapshot)
        .map_err(|e| AppError::Internal(format!("Snapshot serialization failed: {e}")))?;
    value["id"] = json!(session.id);
    Ok(Json(value))
}

/// POST /api/matches
pub async fn create_match(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Json(body): Json<CreateMatchBody>,
) -> Result<Json<JsonValue>, AppError> {
    let defaults = MatchConfig::default();
    let config = MatchConfig::new(
        body.games.unwrap_or(defaults.games),
        body.timed.unwrap_or(defaults.timed),
        body.move_time_limit.unwrap_or(defaults.move_time_limit),
    )?;
    let mut arena = ArenaMatch::new(config)?;
    match (&body.white, &body.black) {
        (Some(white), Some(black)) => {
            arena.assign_players(white.resolve()?, black.resolve()?, body.allow_mirror)?;
        }
        (None, None) => {}
        _ => {
            return Err(AppError::BadRequest(
                "Assign both players or neither".to_string(),
            ))
        }
    }

    let session = registry.create(arena);
    view(&session)
}

/// GET /api/matches/{id}
pub async fn get_match(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    view(&session)
}

/// DELETE /api/matches/{id}
pub async fn delete_match(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if registry.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Match {id} not found")))
    }
}

/// PUT /api/matches/{id}/players
pub async fn assign_players(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
    Json(body): Json<PlayersBody>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    let (white, black) = (body.white.resolve()?, body.black.resolve()?);
    session
        .lock()
        .assign_players(white, black, body.allow_mirror)?;
    view(&session)
}

/// PUT /api/matches/{id}/config
pub async fn update_config(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
    Json(config): Json<MatchConfig>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    session.lock().set_config(config)?;
    view(&session)
}

/// POST /api/matches/{id}/start
pub async fn start(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    let started = session.lock().start()?;
    match started {
        StartOutcome::Started(game) => tracing::info!(session = id, game, "Game started"),
        StartOutcome::MatchReset => tracing::info!(session = id, "Match reset"),
    }
    session.notify();
    view(&session)
}

/// POST /api/matches/{id}/pause
pub async fn pause(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    session.lock().pause()?;
    view(&session)
}

/// POST /api/matches/{id}/resume
pub async fn resume(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    session.lock().resume()?;
    session.notify();
    view(&session)
}

/// POST /api/matches/{id}/resign?side=white
///
/// Without `side`, the side to move resigns.
pub async fn resign(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
    Query(q): Query<SideQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    session.lock().resign(q.side)?;
    view(&session)
}

/// POST /api/matches/{id}/move
pub async fn human_move(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
    Json(body): Json<MoveBody>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    let promotion = body.promotion.as_deref().and_then(|p| p.chars().next());
    session.lock().human_move(&body.from, &body.to, promotion)?;
    session.notify();
    view(&session)
}

/// POST /api/matches/{id}/draw/offer?side=black
pub async fn offer_draw(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
    Query(q): Query<SideQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    session.lock().offer_draw(q.side)?;
    view(&session)
}

/// POST /api/matches/{id}/draw/accept
pub async fn accept_draw(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    session.lock().accept_draw()?;
    view(&session)
}

/// POST /api/matches/{id}/draw/reject
pub async fn reject_draw(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
) -> Result<Json<JsonValue>, AppError> {
    let session = session(&registry, id)?;
    session.lock().reject_draw()?;
    view(&session)
}

/// GET /api/matches/{id}/pgn
pub async fn export_pgn(
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&registry, id)?;
    let pgn = session.lock().pgn();
    Ok(([(header::CONTENT_TYPE, "application/x-chess-pgn")], pgn))
}
