use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use newsboard_db::Database;
use newsboard_types::api::SESSION_COOKIE;

use crate::error::{ApiError, run_blocking};
use crate::state::AppState;

/// Default session lifetime: two weeks.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 14 * 24;

/// Server-side session records, keyed by an opaque token.
pub trait SessionStore: Send + Sync {
    /// Open a session for `username` and return its token.
    fn create(&self, username: &str) -> anyhow::Result<String>;

    /// The username bound to `token`, if the session exists and is live.
    fn resolve(&self, token: &str) -> anyhow::Result<Option<String>>;

    fn revoke(&self, token: &str) -> anyhow::Result<()>;

    /// Drop expired sessions, returning how many were removed.
    fn purge_expired(&self) -> anyhow::Result<usize>;
}

/// Expiry for a session opened now.
fn expires_at(ttl: Duration) -> anyhow::Result<DateTime<Utc>> {
    Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| anyhow::anyhow!("session lifetime {} is out of range", ttl))
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Sessions persisted in the `sessions` table.
pub struct DbSessionStore {
    db: Arc<Database>,
    ttl: Duration,
}

impl DbSessionStore {
    pub fn new(db: Arc<Database>, ttl: Duration) -> Self {
        Self { db, ttl }
    }
}

impl SessionStore for DbSessionStore {
    fn create(&self, username: &str) -> anyhow::Result<String> {
        let token = new_token();
        self.db.insert_session(&token, username, expires_at(self.ttl)?)?;
        Ok(token)
    }

    fn resolve(&self, token: &str) -> anyhow::Result<Option<String>> {
        Ok(self.db.get_live_session(token, Utc::now())?.map(|s| s.username))
    }

    fn revoke(&self, token: &str) -> anyhow::Result<()> {
        self.db.delete_session(token)?;
        Ok(())
    }

    fn purge_expired(&self) -> anyhow::Result<usize> {
        self.db.purge_expired_sessions(Utc::now())
    }
}

/// Process-local sessions; lost on restart.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, (String, DateTime<Utc>)>>> {
        self.sessions
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {}", e))
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, username: &str) -> anyhow::Result<String> {
        let token = new_token();
        let expiry = expires_at(self.ttl)?;
        self.lock()?.insert(token.clone(), (username.to_string(), expiry));
        Ok(token)
    }

    fn resolve(&self, token: &str) -> anyhow::Result<Option<String>> {
        let now = Utc::now();
        Ok(self
            .lock()?
            .get(token)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(username, _)| username.clone()))
    }

    fn revoke(&self, token: &str) -> anyhow::Result<()> {
        self.lock()?.remove(token);
        Ok(())
    }

    fn purge_expired(&self) -> anyhow::Result<usize> {
        let now = Utc::now();
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok(before - sessions.len())
    }
}

/// Session tokens sent by the client, in the order they are tried: the
/// `sessionid` cookie, then a bearer token for clients without a cookie jar.
pub fn session_tokens(headers: &HeaderMap) -> Vec<String> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let mut tokens: Vec<String> = cookie.into_iter().collect();
    if let Some(bearer) = bearer.filter(|b| !tokens.contains(b)) {
        tokens.push(bearer);
    }
    tokens
}

/// The authenticated caller. Taking this as a handler argument makes the
/// route require a live session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
    pub username: String,
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let candidates = session_tokens(&parts.headers);
        if candidates.is_empty() {
            return Err(ApiError::Unauthenticated("Not logged in.".into()));
        }

        // A stale cookie must not hide a live bearer token
        let sessions = state.sessions.clone();
        let resolved = run_blocking("session lookup", move || {
            for token in candidates {
                if let Some(username) = sessions.resolve(&token)? {
                    return Ok(Some(Self { token, username }));
                }
            }
            Ok(None)
        })
        .await?;

        resolved.ok_or_else(|| ApiError::Unauthenticated("Session expired or invalid. Please log in.".into()))
    }
}
