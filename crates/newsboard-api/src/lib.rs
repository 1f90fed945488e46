pub mod authors;
pub mod auth;
pub mod error;
pub mod session;
pub mod state;
pub mod stories;

use axum::{
    Router,
    routing::{any, get, post},
};

pub use error::ApiError;
pub use session::{DbSessionStore, MemorySessionStore, SessionContext, SessionStore};
pub use state::{AppState, AppStateInner};

/// All endpoints, with the per-route answers for unsupported methods.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/login",
            post(auth::login).fallback(auth::login_wrong_method),
        )
        .route(
            "/api/logout",
            post(auth::logout).fallback(auth::logout_wrong_method),
        )
        .route(
            "/api/stories",
            get(stories::list_stories)
                .post(stories::create_story)
                .fallback(stories::stories_wrong_method),
        )
        .route("/api/stories/{key}", any(stories::delete_story))
        .route("/health", get(health))
        .with_state(state)
}

/// GET /health, liveness check without auth.
pub async fn health() -> &'static str {
    "ok"
}
