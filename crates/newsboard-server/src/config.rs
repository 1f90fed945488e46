use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};

use newsboard_api::session::DEFAULT_SESSION_TTL_HOURS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub session_ttl_hours: i64,
    pub session_ttl: Duration,
    pub session_backend: SessionBackend,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path: PathBuf = lookup("NEWSBOARD_DB_PATH").unwrap_or_else(|| "newsboard.db".into()).into();
        let host = lookup("NEWSBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("NEWSBOARD_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("NEWSBOARD_PORT must be a port number")?;

        let session_ttl_hours: i64 = match lookup("NEWSBOARD_SESSION_TTL_HOURS") {
            Some(v) => v.parse().context("NEWSBOARD_SESSION_TTL_HOURS must be an integer")?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };
        if session_ttl_hours <= 0 {
            bail!("NEWSBOARD_SESSION_TTL_HOURS must be positive");
        }
        // Every new session's expiry must stay representable
        let session_ttl = Duration::try_hours(session_ttl_hours)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .with_context(|| {
                format!("NEWSBOARD_SESSION_TTL_HOURS {} is out of range", session_ttl_hours)
            })?;

        let session_backend = match lookup("NEWSBOARD_SESSION_STORE").as_deref() {
            None | Some("sqlite") => SessionBackend::Sqlite,
            Some("memory") => SessionBackend::Memory,
            Some(other) => bail!("NEWSBOARD_SESSION_STORE must be 'sqlite' or 'memory', got '{}'", other),
        };

        let secure_cookies = match lookup("NEWSBOARD_SECURE_COOKIES").as_deref() {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => bail!("NEWSBOARD_SECURE_COOKIES must be true or false, got '{}'", other),
        };

        Ok(Self {
            db_path,
            host,
            port,
            session_ttl_hours,
            session_ttl,
            session_backend,
            secure_cookies,
        })
    }
}
