use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};
use axum::{
    Form,
    body::Body,
    extract::{FromRequest, Request, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

use newsboard_types::api::{LoginForm, SESSION_COOKIE};

use crate::error::{ApiError, run_blocking};
use crate::session::{SessionContext, session_tokens};
use crate::state::AppState;

/// Hash a password with Argon2id and a random salt, producing a PHC string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string.
pub fn verify_password(password: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| anyhow::anyhow!("stored password hash is unreadable: {}", e))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("password verification failed: {}", e)),
    }
}

/// Login bodies are two short fields.
const LOGIN_BODY_LIMIT: usize = 16 * 1024;

fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated("Cannot log in. Invalid username or password.".into())
}

/// POST /api/login (form-encoded `username`, `password`).
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    request: Request,
) -> Result<impl IntoResponse, ApiError> {
    let rejected = |e: &dyn std::fmt::Display| {
        warn!("Rejected login body: {}", e);
        ApiError::bad_request("Login expects a form-encoded username and password.")
    };

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, LOGIN_BODY_LIMIT).await.map_err(|e| rejected(&e))?;

    // No body at all means no credentials, not a malformed request
    let form = if bytes.is_empty() {
        LoginForm::default()
    } else {
        let request = Request::from_parts(parts, Body::from(bytes));
        let Form(form) = Form::<LoginForm>::from_request(request, &state)
            .await
            .map_err(|e| rejected(&e))?;
        form
    };

    let (Some(username), Some(password)) = (form.username, form.password) else {
        return Err(invalid_credentials());
    };
    if username.is_empty() || password.is_empty() {
        return Err(invalid_credentials());
    }

    // Logging in again replaces whatever session the client already holds
    let previous = session_tokens(&headers);
    let state_for_auth = state.clone();
    let user = username.clone();
    let authenticated = run_blocking("login", move || {
        let Some(author) = state_for_auth.db.get_author(&user)? else {
            return Ok(false);
        };
        verify_password(&password, &author.password)
    })
    .await?;

    if !authenticated {
        warn!("Failed login for '{}'", username);
        return Err(invalid_credentials());
    }

    let sessions = state.sessions.clone();
    let user = username.clone();
    let token = run_blocking("session create", move || {
        for old in previous {
            sessions.revoke(&old)?;
        }
        sessions.create(&user)
    })
    .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies);

    info!("{} logged in", username);
    Ok((
        jar.add(cookie),
        (StatusCode::OK, format!("Successfully logged in as {}", username)),
    ))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    session: SessionContext,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = state.sessions.clone();
    let token = session.token.clone();
    run_blocking("session revoke", move || sessions.revoke(&token)).await?;

    info!("{} logged out", session.username);
    Ok((
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        (StatusCode::OK, "Logged out. Goodbye!"),
    ))
}

/// Any non-POST method on /api/login.
pub async fn login_wrong_method() -> ApiError {
    ApiError::NotFound("Bad request.".into())
}

/// Any non-POST method on /api/logout. A session is still required first.
pub async fn logout_wrong_method(_session: SessionContext) -> ApiError {
    ApiError::bad_request("Bad request. Log out with POST.")
}
