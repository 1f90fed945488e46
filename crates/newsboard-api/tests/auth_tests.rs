//! Login, logout, and session enforcement over HTTP.

mod common;

use axum::{
    body::Body,
    http::{Method, StatusCode, header},
};

use common::*;

#[tokio::test]
async fn login_with_valid_credentials_sets_session() {
    let app = create_test_app();

    let response = login_raw(&app, "alice", ALICE_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("alice"));

    let set_cookie = response.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));

    let cookie = response.session_cookie().unwrap();
    let token = cookie.trim_start_matches("sessionid=");
    assert_eq!(app.state.sessions.resolve(token).unwrap().as_deref(), Some("alice"));
}

#[tokio::test]
async fn login_with_invalid_credentials_is_401_without_session() {
    let app = create_test_app();

    for (user, pass) in [("alice", "wrong"), ("mallory", ALICE_PASSWORD), ("alice", ""), ("", "")] {
        let response = login_raw(&app, user, pass).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{user}/{pass}");
        assert!(response.session_cookie().is_none());
    }
}

#[tokio::test]
async fn login_without_form_body_is_bad_request() {
    let app = create_test_app();
    let response = send(
        &app,
        request(Method::POST, "/api/login", None)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_empty_body_is_401() {
    let app = create_test_app();

    let bare = request(Method::POST, "/api/login", None).body(Body::empty()).unwrap();
    let response = send(&app, bare).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.session_cookie().is_none());

    let typed = request(Method::POST, "/api/login", None)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, typed).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_wrong_method_is_404() {
    let app = create_test_app();
    let response = send(&app, request(Method::GET, "/api/login", None).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn relogin_replaces_previous_session() {
    let app = create_test_app();
    let first = login(&app, "alice", ALICE_PASSWORD).await;

    let response = send(
        &app,
        request(Method::POST, "/api/login", Some(&first))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username=bob&password={}", BOB_PASSWORD)))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let old_token = first.trim_start_matches("sessionid=");
    assert!(app.state.sessions.resolve(old_token).unwrap().is_none());
}

#[tokio::test]
async fn logout_without_session_is_rejected() {
    let app = create_test_app();

    let response = send(&app, request(Method::POST, "/api/logout", None).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        request(Method::POST, "/api/logout", Some("sessionid=forged")).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_session() {
    let app = create_test_app();
    let cookie = login(&app, "alice", ALICE_PASSWORD).await;

    let response = send(&app, request(Method::POST, "/api/logout", Some(&cookie)).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.is_empty());

    // The session no longer authorizes anything
    let response = post_story(&app, Some(&cookie), story("h", "tech", "uk", "d")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = send(&app, request(Method::POST, "/api/logout", Some(&cookie)).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_with_wrong_method_is_400_once_authenticated() {
    let app = create_test_app();

    let response = send(&app, request(Method::GET, "/api/logout", None).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let cookie = login(&app, "alice", ALICE_PASSWORD).await;
    let response = send(&app, request(Method::GET, "/api/logout", Some(&cookie)).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let app = create_test_app();
    let cookie = login(&app, "bob", BOB_PASSWORD).await;
    let token = cookie.trim_start_matches("sessionid=");

    let response = send(
        &app,
        request(Method::POST, "/api/logout", None)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn stale_cookie_falls_back_to_bearer_token() {
    let app = create_test_app();
    let cookie = login(&app, "bob", BOB_PASSWORD).await;
    let token = cookie.trim_start_matches("sessionid=");

    let response = send(
        &app,
        request(Method::POST, "/api/logout", Some("sessionid=forged"))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.state.sessions.resolve(token).unwrap().is_none());
}

#[tokio::test]
async fn health_is_public() {
    let app = create_test_app();
    let response = send(&app, request(Method::GET, "/health", None).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}
