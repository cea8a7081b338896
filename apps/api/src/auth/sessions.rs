use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::models::user::User;

/// Sessions unused for this long are dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    last_seen: Instant,
}

/// Bearer-token sessions held in memory. Tokens are random v4 UUIDs.
///
/// A session expires once it has been idle for longer than `idle_ttl`.
/// Expired entries are removed when looked up and swept on every login.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub async fn create(&self, user: &User) -> Uuid {
        let token = Uuid::new_v4();
        let now = Instant::now();
        let session = Session {
            user_id: user.id,
            name: user.name.clone(),
            created_at: Utc::now(),
            last_seen: now,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.last_seen) <= self.idle_ttl);
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "idle sessions pruned");
        }
        sessions.insert(token, session);
        token
    }

    /// Returns the live session and marks it as used.
    pub async fn resolve(&self, token: Uuid) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&token)?;
        let now = Instant::now();
        if now.duration_since(session.last_seen) > self.idle_ttl {
            sessions.remove(&token);
            return None;
        }
        session.last_seen = now;
        Some(session.clone())
    }

    /// Returns whether the token was live.
    pub async fn revoke(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_resolve_revoke() {
        let store = SessionStore::default();
        let user = user();
        let token = store.create(&user).await;

        let session = store.resolve(token).await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.name, "Grace");

        assert!(store.revoke(token).await);
        assert!(store.resolve(token).await.is_none());
        assert!(!store.revoke(token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(&user()).await;

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(store.resolve(token).await.is_some());

        // the lookup above refreshed the idle clock
        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(store.resolve(token).await.is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.resolve(token).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_prunes_stale_sessions() {
        let store = SessionStore::new(Duration::from_secs(60));
        for _ in 0..3 {
            store.create(&user()).await;
        }
        assert_eq!(store.len().await, 3);

        tokio::time::advance(Duration::from_secs(120)).await;
        let fresh = store.create(&user()).await;

        assert_eq!(store.len().await, 1);
        assert!(store.resolve(fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_unknown_token_does_not_resolve() {
        let store = SessionStore::default();
        assert!(store.resolve(Uuid::new_v4()).await.is_none());
    }
}
