//! Session-scoped authorization store
//!
//! Holds one permission cell per authenticated session. The cell is filled by
//! a single shared fetch: every caller that arrives while the first lookup is
//! in flight awaits that same lookup instead of starting its own. Once filled,
//! an entry stays authoritative until the session is closed (logout) or the
//! expiry sweep drops it. A failed lookup caches nothing and drops the entry
//! again, so the next navigation tries again.

use crate::source::PermissionSource;
use shopdesk_core::{
    performance, PermissionSet, SessionKey, SessionToken, ShopdeskError, ShopdeskResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, info};

struct SessionEntry {
    permissions: OnceCell<Arc<PermissionSet>>,
    opened_at: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            permissions: OnceCell::new(),
            opened_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.opened_at.elapsed() > ttl
    }
}

/// Permission cache shared by every request of the gateway, keyed by session
#[derive(Clone)]
pub struct AuthorizationStore {
    source: Arc<dyn PermissionSource>,
    sessions: Arc<RwLock<HashMap<SessionKey, Arc<SessionEntry>>>>,
    ttl: Duration,
    fetches: Arc<AtomicU64>,
}

impl AuthorizationStore {
    pub fn new(source: Arc<dyn PermissionSource>, ttl: Duration) -> Self {
        Self {
            source,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            fetches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a fresh, unpopulated entry for a session that just logged in.
    /// Any previous entry under the same key is discarded.
    pub fn open_session(&self, key: SessionKey) {
        debug!(username = %key.username, "Opening authorization entry");
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(SessionEntry::new()));
    }

    /// Drop every entry opened with `token`, whatever the username.
    pub fn close_token(&self, token: &SessionToken) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|key, _| &key.token != token);
        before - sessions.len()
    }

    /// Permissions already resolved for `key`, without any network call
    pub fn cached(&self, key: &SessionKey) -> Option<Arc<PermissionSet>> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .and_then(|entry| entry.permissions.get().cloned())
    }

    /// Permissions for `key`, fetching them at most once per entry
    pub async fn permissions(&self, key: &SessionKey) -> ShopdeskResult<Arc<PermissionSet>> {
        let entry = self.entry(key);

        let result = entry
            .permissions
            .get_or_try_init(|| async {
                self.fetches.fetch_add(1, Ordering::Relaxed);
                let names = performance::measure_async(
                    "fetch_permissions",
                    self.source.fetch_permissions(&key.username),
                )
                .await?;
                let set: PermissionSet = names.into_iter().collect();
                if set.is_empty() {
                    info!(username = %key.username, "Permission set loaded, nothing granted");
                } else {
                    info!(
                        username = %key.username,
                        granted = set.len(),
                        "Permission set loaded"
                    );
                }
                Ok::<_, ShopdeskError>(Arc::new(set))
            })
            .await;

        match result {
            Ok(set) => Ok(Arc::clone(set)),
            Err(e) => {
                self.discard_unpopulated(key, &entry);
                Err(e)
            }
        }
    }

    /// Remove entries older than the session lifetime. Returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(self.ttl));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Swept expired sessions");
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Lookups started since the store was created
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    // A failed lookup must not leave an entry behind: unknown tokens would
    // otherwise pile up until the sweep. Entries other callers are still
    // waiting on stay so their retry lands in the map.
    fn discard_unpopulated(&self, key: &SessionKey, entry: &Arc<SessionEntry>) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let removable = sessions.get(key).is_some_and(|current| {
            Arc::ptr_eq(current, entry)
                && current.permissions.get().is_none()
                && Arc::strong_count(current) == 2
        });
        if removable {
            sessions.remove(key);
        }
    }

    fn entry(&self, key: &SessionKey) -> Arc<SessionEntry> {
        if let Some(entry) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
        {
            return Arc::clone(entry);
        }

        // Sessions that predate this process, or outlived the ttl, get a new
        // entry lazily. Re-check under the write lock so racing callers share it.
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions
            .entry(key.clone())
            .or_insert_with(|| Arc::new(SessionEntry::new()));
        if entry.is_expired(self.ttl) {
            *entry = Arc::new(SessionEntry::new());
        }
        Arc::clone(entry)
    }
}
