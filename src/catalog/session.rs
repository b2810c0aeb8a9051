//! Per-session catalogs with idle expiry.

use super::ToolCatalog;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct SessionEntry {
    catalog: Arc<ToolCatalog>,
    last_seen: Instant,
}

/// Catalog store keyed by server-issued session ids.
///
/// Sessions exist only once [`SessionCatalogs::create`] has issued their id.
/// Each starts from the default catalog and is evicted once it has been idle
/// for longer than the configured TTL.
pub struct SessionCatalogs {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionCatalogs {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Start a session with a fresh id and the default catalog.
    pub async fn create(&self) -> (String, Arc<ToolCatalog>) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.sweep(&mut sessions, now);

        let id = ulid::Ulid::new().to_string();
        let catalog = Arc::new(ToolCatalog::default());
        sessions.insert(
            id.clone(),
            SessionEntry {
                catalog: catalog.clone(),
                last_seen: now,
            },
        );
        debug!("Created tool catalog for session {}", id);
        (id, catalog)
    }

    /// Catalog of a live session, refreshing its idle timer. Ids that were
    /// never issued, or have expired, return `None`.
    pub async fn get(&self, session_id: &str) -> Option<Arc<ToolCatalog>> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.sweep(&mut sessions, now);

        let entry = sessions.get_mut(session_id)?;
        entry.last_seen = now;
        Some(entry.catalog.clone())
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every session idle since before `now - ttl`.
    pub async fn evict_expired(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.sweep(&mut sessions, now)
    }

    fn sweep(&self, sessions: &mut HashMap<String, SessionEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle session catalog(s)", evicted);
        }
        evicted
    }
}
