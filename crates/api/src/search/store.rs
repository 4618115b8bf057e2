use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mineruca_core::search::SearchSession;
use mineruca_core::types::DbId;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A session shared between the request that runs it and any later
/// fallback or poll requests.
pub type SharedSession = Arc<Mutex<SearchSession>>;

/// How often expired sessions are swept.
const SWEEP_INTERVAL_SECS: u64 = 60;

struct StoredSession {
    owner_id: DbId,
    session: SharedSession,
    created_at: Instant,
}

/// In-memory search sessions with a fixed time-to-live.
pub struct SearchSessionStore {
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
    ttl: Duration,
}

impl SearchSessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Register a new session owned by `owner_id` and return its id.
    pub async fn insert(&self, owner_id: DbId, session: SearchSession) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(
            id,
            StoredSession {
                owner_id,
                session: Arc::clone(&shared),
                created_at: Instant::now(),
            },
        );
        (id, shared)
    }

    /// Look up a live session. Sessions of other users and expired sessions
    /// are reported as missing.
    pub async fn get(&self, id: Uuid, owner_id: DbId) -> Option<SharedSession> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .filter(|s| s.owner_id == owner_id && s.created_at.elapsed() < self.ttl)
            .map(|s| Arc::clone(&s.session))
    }

    /// Drop expired sessions, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.created_at.elapsed() < self.ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Spawn a task that periodically purges expired sessions until `cancel`
/// fires.
pub fn start_session_sweeper(
    store: Arc<SearchSessionStore>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let removed = store.purge_expired().await;
                    if removed > 0 {
                        tracing::debug!(removed, "Purged expired search sessions");
                    }
                }
            }
        }
    })
}
