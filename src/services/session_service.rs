//! Per-session lookup state.
//!
//! A session stands in for one consuming view: it remembers which nearby query is current and owns
//! the photo URL cache. In-flight lookups are never cancelled; when a newer query has started,
//! results of the older one are discarded on arrival.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::debug;
use tokio::time::Instant;
use uuid::Uuid;

use crate::models::coordinate::Coordinate;
use crate::services::photo_url_service::PhotoUrlResolver;

/// Identity of one nearby query within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTicket {
    pub id: Uuid,
    pub origin: Coordinate,
    pub candidate_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NearbySession {
    current: Option<QueryTicket>,
    photos: PhotoUrlResolver,
}

impl NearbySession {
    pub fn new(photos: PhotoUrlResolver) -> Self {
        Self {
            current: None,
            photos,
        }
    }

    /// Starts a query; any earlier ticket of this session becomes stale.
    pub fn begin(&mut self, origin: Coordinate, candidate_types: Vec<String>) -> QueryTicket {
        let ticket = QueryTicket {
            id: Uuid::new_v4(),
            origin,
            candidate_types,
        };
        self.current = Some(ticket.clone());
        ticket
    }

    pub fn is_current(&self, ticket: &QueryTicket) -> bool {
        self.current.as_ref() == Some(ticket)
    }

    /// Hands `value` back only if `ticket` still identifies the current query.
    pub fn accept<T>(&self, ticket: &QueryTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!("Discarding stale result for query {}", ticket.id);
            None
        }
    }

    pub fn photos(&mut self) -> &mut PhotoUrlResolver {
        &mut self.photos
    }
}

/// Idle time after which a session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Entry {
    session: NearbySession,
    last_used: Instant,
}

/// Sessions keyed by client-supplied id. Locks are held only between awaits, never across one.
///
/// Sessions idle for longer than the TTL are swept whenever a new id arrives; at capacity the
/// least recently used session makes room.
pub struct SessionRegistry {
    template: PhotoUrlResolver,
    ttl: Duration,
    max_sessions: usize,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl SessionRegistry {
    pub fn new(template: PhotoUrlResolver) -> Self {
        Self::with_limits(template, DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_limits(template: PhotoUrlResolver, ttl: Duration, max_sessions: usize) -> Self {
        Self {
            template,
            ttl,
            max_sessions: max_sessions.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Session that lives for a single request and is not registered.
    pub fn ephemeral(&self) -> NearbySession {
        NearbySession::new(self.template.clone())
    }

    /// Runs `f` against the named session, creating it on first use.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut NearbySession) -> R) -> R {
        let now = Instant::now();
        let mut sessions = self.lock();

        if !sessions.contains_key(id) {
            self.make_room(&mut sessions, now);
        }

        let entry = sessions.entry(id.to_string()).or_insert_with(|| Entry {
            session: NearbySession::new(self.template.clone()),
            last_used: now,
        });
        entry.last_used = now;
        f(&mut entry.session)
    }

    /// Runs `f` against the named session only if it still exists.
    pub fn with_existing<R>(&self, id: &str, f: impl FnOnce(&mut NearbySession) -> R) -> Option<R> {
        let now = Instant::now();
        let mut sessions = self.lock();

        sessions.get_mut(id).map(|entry| {
            entry.last_used = now;
            f(&mut entry.session)
        })
    }

    pub fn end(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn make_room(&self, sessions: &mut HashMap<String, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_used) < self.ttl);
        if sessions.len() < before {
            debug!("Evicted {} idle sessions", before - sessions.len());
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    debug!("Session limit reached, evicting {}", id);
                    sessions.remove(&id);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::place::{PhotoRef, Place};

    fn session() -> NearbySession {
        NearbySession::new(PhotoUrlResolver::with_api_key("key"))
    }

    fn delhi() -> Coordinate {
        Coordinate::new(28.6139, 77.2090)
    }

    #[test]
    fn test_current_ticket_is_accepted() {
        let mut session = session();
        let ticket = session.begin(delhi(), vec!["restaurant".into()]);

        assert_eq!(session.accept(&ticket, 7), Some(7));
    }

    #[test]
    fn test_superseded_ticket_is_discarded() {
        let mut session = session();
        let old = session.begin(delhi(), vec!["restaurant".into()]);
        let new = session.begin(delhi(), vec!["restaurant".into()]);

        assert_eq!(session.accept(&old, "stale"), None);
        assert_eq!(session.accept(&new, "fresh"), Some("fresh"));
    }

    #[test]
    fn test_ticket_from_other_session_is_discarded() {
        let mut first = session();
        let second = session();
        let ticket = first.begin(delhi(), vec!["lodging".into()]);

        assert!(!second.is_current(&ticket));
    }

    #[test]
    fn test_registry_keeps_state_per_session() {
        let registry = SessionRegistry::new(PhotoUrlResolver::with_api_key("key"));
        let place = Place {
            id: "p".into(),
            name: "p".into(),
            address: String::new(),
            location: delhi(),
            rating: None,
            photo_refs: vec![PhotoRef::LegacyToken("tok".into())],
        };

        let ticket = registry.with_session("a", |s| s.begin(delhi(), vec!["cafe".into()]));
        registry.with_session("a", |s| s.photos().resolve_url(&place));
        registry.with_session("b", |s| s.begin(delhi(), vec!["cafe".into()]));

        assert!(registry.with_session("a", |s| s.is_current(&ticket)));
        assert_eq!(registry.with_session("a", |s| s.photos().cached_len()), 1);
        assert_eq!(registry.with_session("b", |s| s.photos().cached_len()), 0);
        assert_eq!(registry.len(), 2);

        assert!(registry.end("a"));
        assert!(!registry.end("a"));
        assert_eq!(registry.len(), 1);
    }

    fn registry(ttl_secs: u64, max_sessions: usize) -> SessionRegistry {
        SessionRegistry::with_limits(
            PhotoUrlResolver::with_api_key("key"),
            Duration::from_secs(ttl_secs),
            max_sessions,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let registry = registry(60, 100);
        let ticket = registry.with_session("idle", |s| s.begin(delhi(), vec!["cafe".into()]));
        registry.with_session("busy", |s| s.begin(delhi(), vec!["cafe".into()]));

        tokio::time::advance(Duration::from_secs(45)).await;
        registry.with_existing("busy", |_| ());
        tokio::time::advance(Duration::from_secs(20)).await;
        registry.with_session("new", |_| ());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.with_existing("idle", |s| s.is_current(&ticket)), None);
        assert!(registry.with_existing("busy", |_| ()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_least_recently_used_session_makes_room() {
        let registry = registry(3600, 2);

        registry.with_session("a", |_| ());
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.with_session("b", |_| ());
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.with_session("a", |_| ());
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.with_session("c", |_| ());

        assert_eq!(registry.len(), 2);
        assert!(registry.with_existing("a", |_| ()).is_some());
        assert!(registry.with_existing("b", |_| ()).is_none());
        assert!(registry.with_existing("c", |_| ()).is_some());
    }

    #[test]
    fn test_distinct_ids_never_exceed_the_cap() {
        let registry = registry(3600, 16);

        for i in 0..200 {
            registry.with_session(&format!("client-{}", i), |_| ());
        }

        assert_eq!(registry.len(), 16);
    }

    #[test]
    fn test_with_existing_does_not_create_sessions() {
        let registry = registry(3600, 16);

        assert_eq!(registry.with_existing("gone", |_| 1), None);
        assert!(registry.is_empty());
    }
}
