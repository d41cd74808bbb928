//! Registration form sessions held by the HTTP layer

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::registration::{FormState, RegistrationForm};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Too many open registration sessions ({0})")]
pub struct SessionLimitReached(pub usize);

struct Session {
    form: Arc<RegistrationForm>,
    opened_at: Instant,
}

impl Session {
    fn expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.opened_at) >= ttl
    }
}

/// Open form sessions with an idle lifetime and a size cap.
///
/// Expired sessions are swept whenever a new one is opened. A session with a
/// submission in flight is never evicted.
pub struct SessionStore {
    ttl: Duration,
    capacity: usize,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Looks up a live session. Expired sessions read as unknown.
    pub async fn get(&self, id: Uuid) -> Option<Arc<RegistrationForm>> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id)?;
        if session.expired(Instant::now(), self.ttl)
            && session.form.state() != FormState::Submitting
        {
            return None;
        }
        Some(session.form.clone())
    }

    pub async fn insert(&self, form: Arc<RegistrationForm>) -> Result<(), SessionLimitReached> {
        self.insert_at(form, Instant::now()).await
    }

    async fn insert_at(
        &self,
        form: Arc<RegistrationForm>,
        now: Instant,
    ) -> Result<(), SessionLimitReached> {
        let mut sessions = self.sessions.write().await;
        make_room(&mut sessions, now, self.ttl, self.capacity)?;
        sessions.insert(
            form.id(),
            Session {
                form,
                opened_at: now,
            },
        );
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn evictable(session: &Session) -> bool {
    session.form.state() != FormState::Submitting
}

/// Drops expired sessions, then finished ones, then the oldest idle ones,
/// until there is room for one more.
fn make_room(
    sessions: &mut HashMap<Uuid, Session>,
    now: Instant,
    ttl: Duration,
    capacity: usize,
) -> Result<(), SessionLimitReached> {
    let before = sessions.len();
    sessions.retain(|_, session| !(session.expired(now, ttl) && evictable(session)));

    if sessions.len() >= capacity {
        sessions.retain(|_, session| session.form.state() != FormState::Submitted);
    }

    while sessions.len() >= capacity {
        let oldest = sessions
            .iter()
            .filter(|(_, session)| evictable(session))
            .min_by_key(|(_, session)| session.opened_at)
            .map(|(id, _)| *id);

        match oldest {
            Some(id) => {
                debug!("Evicting idle session {}", id);
                sessions.remove(&id);
            }
            None => return Err(SessionLimitReached(capacity)),
        }
    }

    let evicted = before - sessions.len();
    if evicted > 0 {
        info!("Evicted {} registration session(s)", evicted);
    }
    Ok(())
}
