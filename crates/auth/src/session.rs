//! Opaque bearer session tokens with expiry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::Role;

/// Length of a session token (mixed-case alphanumeric).
const TOKEN_LEN: usize = 32;

/// An issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }
}

/// In-memory session token store.
///
/// Tokens are opaque random strings; an expired token verifies as absent
/// and is dropped from the store on the verifying lookup.
#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Issue a fresh token for the user.
    pub fn issue(&self, user_id: Uuid, role: Role) -> String {
        let token = generate_token();
        let session = Session {
            user_id,
            role,
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };

        self.sessions.write().insert(token.clone(), session);
        token
    }

    /// Resolve a presented token to its live session.
    pub fn verify(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.write();
        match sessions.get(token) {
            Some(session) if !session.is_expired() => Some(session.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Drop a token. Returns `false` when it was not present.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    /// Number of stored sessions, expired ones included.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..62);
            if idx < 10 {
                (b'0' + idx) as char
            } else if idx < 36 {
                (b'a' + idx - 10) as char
            } else {
                (b'A' + idx - 36) as char
            }
        })
        .collect()
}
