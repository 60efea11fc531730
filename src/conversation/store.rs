use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::types::Session;

#[derive(Debug, Clone, Copy)]
struct Slot {
    session: Session,
    touched_at: Instant,
}

/// Per-user conversation sessions.
///
/// One entry per Telegram user id. Sessions untouched for longer than the
/// TTL read back as idle and are dropped by [`SessionStore::purge_expired`].
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<i64, Slot>,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// Creates a store; `ttl = None` keeps sessions until the process exits.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Store with the TTL from `SESSION_TTL_SECS`.
    pub fn from_config() -> Self {
        Self::new(crate::core::config::session::ttl())
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Current session of `user`; idle when none exists or it expired.
    pub fn get(&self, user: i64) -> Session {
        self.get_at(user, Instant::now())
    }

    pub fn put(&self, user: i64, session: Session) {
        self.put_at(user, session, Instant::now());
    }

    pub fn clear(&self, user: i64) {
        self.sessions.remove(&user);
    }

    /// Number of stored sessions, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops expired sessions and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Starts a background task that purges expired sessions every `period`.
    pub fn spawn_cleanup_task(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let purged = self.purge_expired();
                if purged > 0 {
                    log::info!("Purged {} abandoned conversation(s)", purged);
                }
            }
        })
    }

    fn is_expired(&self, slot: &Slot, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(slot.touched_at) > ttl,
            None => false,
        }
    }

    pub(crate) fn get_at(&self, user: i64, now: Instant) -> Session {
        match self.sessions.get(&user) {
            Some(slot) if !self.is_expired(&slot, now) => slot.session,
            _ => Session::default(),
        }
    }

    pub(crate) fn put_at(&self, user: i64, session: Session, now: Instant) {
        if session.is_idle() {
            self.sessions.remove(&user);
            return;
        }
        self.sessions.insert(
            user,
            Slot {
                session,
                touched_at: now,
            },
        );
    }

    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, slot| !self.is_expired(slot, now));
        before.saturating_sub(self.sessions.len())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::types::{Entry, Genre, Stage};
    use pretty_assertions::assert_eq;

    fn awaiting_rock() -> Session {
        Session::at(Stage::AwaitingLink(Entry::GenreLeague(Genre::Rock)))
    }

    #[test]
    fn test_missing_session_is_idle() {
        let store = SessionStore::default();
        assert_eq!(store.get(42), Session::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_get_clear() {
        let store = SessionStore::default();
        store.put(42, awaiting_rock());
        assert_eq!(store.get(42), awaiting_rock());
        assert_eq!(store.get(7), Session::default());

        store.clear(42);
        assert_eq!(store.get(42), Session::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_putting_idle_removes_entry() {
        let store = SessionStore::default();
        store.put(1, Session::at(Stage::ChoosingLeague));
        store.put(1, Session::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_sessions_are_isolated_per_user() {
        let store = SessionStore::default();
        store.put(1, Session::at(Stage::ChoosingGenre));
        store.put(2, Session::at(Stage::AwaitingLink(Entry::AiLeague)));
        store.clear(1);
        assert_eq!(store.get(2), Session::at(Stage::AwaitingLink(Entry::AiLeague)));
    }

    #[test]
    fn test_expired_session_reads_as_idle() {
        let store = SessionStore::new(Some(Duration::from_secs(60)));
        let start = Instant::now();
        store.put_at(42, awaiting_rock(), start);

        assert_eq!(store.get_at(42, start + Duration::from_secs(59)), awaiting_rock());
        assert_eq!(store.get_at(42, start + Duration::from_secs(61)), Session::default());
    }

    #[test]
    fn test_purge_expired_keeps_fresh_sessions() {
        let store = SessionStore::new(Some(Duration::from_secs(60)));
        let start = Instant::now();
        store.put_at(1, awaiting_rock(), start);
        store.put_at(2, Session::at(Stage::ChoosingLeague), start + Duration::from_secs(50));

        let purged = store.purge_expired_at(start + Duration::from_secs(100));
        assert_eq!(purged, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_at(2, start + Duration::from_secs(100)), Session::at(Stage::ChoosingLeague));
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let store = SessionStore::new(None);
        let start = Instant::now();
        store.put_at(1, awaiting_rock(), start);
        assert_eq!(store.purge_expired_at(start + Duration::from_secs(365 * 24 * 3600)), 0);
        assert_eq!(store.get_at(1, start + Duration::from_secs(365 * 24 * 3600)), awaiting_rock());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_evicts_expired_sessions() {
        let store = Arc::new(SessionStore::new(Some(Duration::from_secs(60))));
        store.put(1, awaiting_rock());

        let task = Arc::clone(&store).spawn_cleanup_task(Duration::from_secs(600));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.len(), 1, "fresh sessions survive the first sweep");

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(store.is_empty());
        task.abort();
    }
}
