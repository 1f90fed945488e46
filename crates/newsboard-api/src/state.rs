use std::sync::Arc;

use newsboard_db::Database;

use crate::session::SessionStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub sessions: Arc<dyn SessionStore>,
    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub secure_cookies: bool,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            db,
            sessions,
            secure_cookies: false,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
