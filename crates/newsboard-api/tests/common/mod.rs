//! Shared helpers for the HTTP tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use newsboard_api::authors::register_author;
use newsboard_api::{AppState, AppStateInner, MemorySessionStore, router};
use newsboard_db::Database;

pub const ALICE_PASSWORD: &str = "alice-pass";
pub const BOB_PASSWORD: &str = "bob-pass";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Fresh in-memory board with authors `alice` and `bob`.
pub fn create_test_app() -> TestApp {
    let db = Arc::new(Database::open_in_memory().unwrap());
    register_author(&db, "alice", "Alice", ALICE_PASSWORD).unwrap();
    register_author(&db, "bob", "Bob", BOB_PASSWORD).unwrap();

    let state: AppState = Arc::new(AppStateInner::new(db, Arc::new(MemorySessionStore::default())));
    TestApp {
        router: router(state.clone()),
        state,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// `name=value` of the session cookie set by this response, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| v.starts_with("sessionid="))
            .map(|v| v.split(';').next().unwrap_or_default().to_string())
            .next()
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> TestResponse {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

pub async fn login_raw(app: &TestApp, username: &str, password: &str) -> TestResponse {
    let body = format!("username={}&password={}", username, password);
    send(
        app,
        request(Method::POST, "/api/login", None)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

/// Log in and return the session cookie.
pub async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let response = login_raw(app, username, password).await;
    assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
    response.session_cookie().expect("login should set a session cookie")
}

pub async fn post_story(app: &TestApp, cookie: Option<&str>, body: serde_json::Value) -> TestResponse {
    send(
        app,
        request(Method::POST, "/api/stories", cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn list(app: &TestApp, query: &str) -> TestResponse {
    let uri = if query.is_empty() {
        "/api/stories".to_string()
    } else {
        format!("/api/stories?{}", query)
    };
    send(app, request(Method::GET, &uri, None).body(Body::empty()).unwrap()).await
}

pub fn story(headline: &str, category: &str, region: &str, details: &str) -> serde_json::Value {
    serde_json::json!({
        "headline": headline,
        "category": category,
        "region": region,
        "details": details,
    })
}
