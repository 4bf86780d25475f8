//! End-to-end scenarios against the orchestration core, without HTTP.

use std::sync::Mutex;

use arena_core::arena::ArenaMatch;
use arena_core::config::MatchConfig;
use arena_core::error::{MoveRejected, MoveServiceError};
use arena_core::game_data::{GameResult, GameStatus, Side};
use arena_core::move_source::{play_ai_turn, AiTurn, MoveRequest, MoveService};
use arena_core::players::PlayerIdentity;
use arena_core::position::split_uci;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

fn human(name: &str) -> PlayerIdentity {
    PlayerIdentity::resolve("human", Some(name)).unwrap()
}

fn ai(id: &str) -> PlayerIdentity {
    PlayerIdentity::resolve(id, None).unwrap()
}

fn started(config: MatchConfig, white: PlayerIdentity, black: PlayerIdentity) -> ArenaMatch {
    let mut arena = ArenaMatch::with_players(config, white, black, true).unwrap();
    arena.start().unwrap();
    arena
}

/// Replies with a fixed string, like a model that ignores the position.
struct Parrot(&'static str);

#[async_trait::async_trait]
impl MoveService for Parrot {
    async fn request_move(&self, _: &MoveRequest) -> Result<String, MoveServiceError> {
        Ok(self.0.to_string())
    }
}

struct Down;

#[async_trait::async_trait]
impl MoveService for Down {
    async fn request_move(&self, _: &MoveRequest) -> Result<String, MoveServiceError> {
        Err(MoveServiceError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

#[test]
fn test_random_games_keep_core_invariants() {
    let config = MatchConfig::new(5, false, 60).unwrap();
    let mut arena = ArenaMatch::with_players(config, human("A"), human("B"), false).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    for game in 1..=5 {
        arena.start().unwrap();
        assert_eq!(arena.game().number(), game);
        let mut plies = 0;
        while arena.status() == GameStatus::Playing && plies < 300 {
            let side = arena.game().turn();
            let counter = arena.game().move_number();
            let legal = arena.game().legal_moves();
            let uci = legal.choose(&mut rng).unwrap().clone();
            let (from, to, promotion) = split_uci(&uci).unwrap();
            let applied = arena.human_move(from, to, promotion).unwrap();

            assert_eq!(applied.side, side);
            let forfeited = applied
                .outcome
                .as_ref()
                .is_some_and(|o| o.reason.ends_with("made the same move 3 times"));
            if !forfeited {
                assert_eq!(arena.game().turn(), side.opponent());
            }
            let expected = if side == Side::Black && !forfeited {
                counter + 1
            } else {
                counter
            };
            assert_eq!(arena.game().move_number(), expected);
            plies += 1;
        }
        if arena.status() == GameStatus::Playing {
            arena.resign(None).unwrap();
        }
        let total = arena.score().score(Side::White) + arena.score().score(Side::Black);
        assert_eq!(total, game as f64);
    }

    assert!(arena.score().is_complete());
    assert!(arena.score().winner().is_some());
}

#[test]
fn test_illegal_moves_are_idempotent() {
    let config = MatchConfig::new(1, true, 60).unwrap();
    let mut arena = started(config, human("A"), human("B"));
    arena.human_move("d2", "d4", None).unwrap();
    let before = arena.snapshot();

    for (from, to, promo) in [
        ("d4", "d6", None),
        ("e7", "e4", None),
        ("e7", "e5", Some('q')),
        ("i9", "e5", None),
    ] {
        assert!(arena.human_move(from, to, promo).is_err());
    }
    assert_eq!(arena.snapshot(), before);
}

#[test]
fn test_timeout_ends_game_for_white() {
    let config = MatchConfig::new(1, true, 60).unwrap();
    let mut arena = started(config, human("Alice"), ai("gemini-2.5-pro"));
    let mut outcome = None;
    for _ in 0..60 {
        outcome = outcome.or(arena.tick());
    }
    let outcome = outcome.unwrap();
    assert_eq!(outcome.result, GameResult::Black);
    assert_eq!(outcome.reason, "Alice ran out of time");
    assert_eq!(arena.tick(), None);
    assert_eq!(arena.score().outcomes().len(), 1);
    assert_eq!(
        arena.human_move("e2", "e4", None),
        Err(MoveRejected::NotPlaying)
    );
}

#[test]
fn test_untimed_game_never_times_out() {
    let config = MatchConfig::new(1, false, 60).unwrap();
    let mut arena = started(config, human("Alice"), human("Bob"));
    for _ in 0..600 {
        assert_eq!(arena.tick(), None);
    }
    assert_eq!(arena.status(), GameStatus::Playing);
}

#[tokio::test]
async fn test_off_list_reply_still_moves() {
    let config = MatchConfig::new(1, false, 60).unwrap();
    let arena = Mutex::new(started(config, ai("kimi-k2"), human("Bob")));
    let mut rng = StdRng::seed_from_u64(5);

    let turn = play_ai_turn(&arena, &Parrot("e2e5"), &mut rng).await;
    let Some(AiTurn::Applied { resolved, applied }) = turn else {
        panic!("expected the fallback move to be applied");
    };
    assert!(resolved.fallback);
    assert_eq!(applied.side, Side::White);

    let arena = arena.lock().unwrap();
    assert_eq!(arena.game().history(), &[resolved.uci]);
    assert_eq!(arena.status(), GameStatus::Playing);
    assert!(arena.score().outcomes().is_empty());
}

#[tokio::test]
async fn test_service_outage_is_absorbed() {
    let config = MatchConfig::new(1, false, 60).unwrap();
    let arena = Mutex::new(started(config, ai("deepseek-v3"), ai("deepseek-v3")));
    let mut rng = StdRng::seed_from_u64(9);

    for ply in 0..10 {
        let turn = play_ai_turn(&arena, &Down, &mut rng).await;
        match turn {
            Some(AiTurn::Applied { resolved, .. }) => {
                assert_eq!(resolved.error.as_deref(), Some("API error, used random move"));
            }
            None => break,
            other => panic!("unexpected turn at ply {ply}: {other:?}"),
        }
    }
    let arena = arena.lock().unwrap();
    assert!(!arena.game().history().is_empty());
}
