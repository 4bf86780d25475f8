//! In-memory match sessions.
//!
//! Each session owns its `ArenaMatch` behind a std mutex plus two background
//! tasks: a one-second clock ticker and the AI driver. Both tasks stop once
//! the session is closed. Nothing here is persisted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Notify;

use arena_core::arena::ArenaMatch;
use arena_core::move_source::{play_ai_turn, AiTurn, MoveService};

pub struct Session {
    pub id: u64,
    arena: Mutex<ArenaMatch>,
    wake: Notify,
    closed: AtomicBool,
}

impl Session {
    pub fn lock(&self) -> MutexGuard<'_, ArenaMatch> {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tell the AI driver the match changed.
    pub fn notify(&self) {
        self.wake.notify_one();
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<u64, Arc<Session>>>,
    next_id: AtomicU64,
    service: Arc<dyn MoveService>,
    ai_move_delay: Duration,
}

impl SessionRegistry {
    pub fn new(service: Arc<dyn MoveService>, ai_move_delay: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            service,
            ai_move_delay,
        }
    }

    pub fn service(&self) -> Arc<dyn MoveService> {
        Arc::clone(&self.service)
    }

    /// Register a match and start its ticker and AI driver.
    pub fn create(&self, arena: ArenaMatch) -> Arc<Session> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let session = Arc::new(Session {
            id,
            arena: Mutex::new(arena),
            wake: Notify::new(),
            closed: AtomicBool::new(false),
        });
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&session));

        tokio::spawn(run_clock(Arc::clone(&session)));
        tokio::spawn(drive_ai(
            Arc::clone(&session),
            self.service(),
            self.ai_move_delay,
        ));
        tracing::info!(session = id, "Match session created");
        session
    }

    pub fn get(&self, id: u64) -> Option<Arc<Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn remove(&self, id: u64) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match removed {
            Some(session) => {
                session.close();
                tracing::info!(session = id, "Match session removed");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

async fn run_clock(session: Arc<Session>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;
    loop {
        interval.tick().await;
        if session.is_closed() {
            break;
        }
        let outcome = session.lock().tick();
        if let Some(outcome) = outcome {
            tracing::info!(session = session.id, reason = %outcome.reason, "Clock expired");
            session.notify();
        }
    }
}

async fn drive_ai(session: Arc<Session>, service: Arc<dyn MoveService>, delay: Duration) {
    let mut rng = StdRng::from_os_rng();
    loop {
        if session.is_closed() {
            break;
        }
        let due = session.lock().ai_to_move().is_some();
        if !due {
            session.wake.notified().await;
            continue;
        }

        tokio::time::sleep(delay).await;
        match play_ai_turn(&session.arena, service.as_ref(), &mut rng).await {
            Some(AiTurn::Applied { resolved, applied }) => {
                tracing::info!(
                    session = session.id,
                    side = %applied.side,
                    san = %applied.record.notation,
                    fallback = resolved.fallback,
                    "AI move applied"
                );
            }
            Some(AiTurn::Rejected(e)) => {
                tracing::error!(session = session.id, error = %e, "AI move rejected");
                session.wake.notified().await;
            }
            Some(AiTurn::NoLegalMoves) => {
                tracing::error!(session = session.id, "AI to move without legal moves");
                session.wake.notified().await;
            }
            Some(AiTurn::Discarded) | None => {}
        }
    }
    tracing::debug!(session = session.id, "AI driver stopped");
}
