//! Integration tests for authentication, sessions and user administration.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use tracklink_entity::user::UserRole;

use helpers::TestApp;

#[tokio::test]
async fn test_login_sets_token_and_cookie() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User)
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["data"]["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(response.body["data"]["user"]["role"], "user");
    assert!(response.body["data"]["user"].get("password_hash").is_none());

    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.starts_with(&format!("tracklink_session={token}")));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    app.create_user("bob", "password123", UserRole::User).await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "bob", "password": "nope-nope" })),
            None,
        )
        .await;
    let unknown_user = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "nobody", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["error"], unknown_user.body["error"]);
}

#[tokio::test]
async fn test_cookie_authenticates_me() {
    let app = TestApp::new().await;
    app.create_user("carol", "password123", UserRole::User)
        .await;
    let token = app.login("carol", "password123").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header("cookie", format!("tracklink_session={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "carol");
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = TestApp::new().await;
    app.create_user("dave", "password123", UserRole::User).await;
    let token = app.login("dave", "password123").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_routes_are_admin_only() {
    let app = TestApp::new().await;
    app.create_user("erin", "password123", UserRole::User).await;
    let token = app.login("erin", "password123").await;

    let response = app.request("GET", "/api/users", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["code"], "AUTHORIZATION");

    let response = app.request("GET", "/api/users", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_manages_users() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let created = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "frank", "password": "password123" })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["role"], "user");
    let frank = created.body["data"]["id"].as_str().unwrap().to_string();

    let duplicate = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "FRANK", "password": "password123" })),
            Some(&token),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let short = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "username": "grace", "password": "short" })),
            Some(&token),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let promoted = app
        .request(
            "PUT",
            &format!("/api/users/{frank}/role"),
            Some(json!({ "role": "admin" })),
            Some(&token),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["data"]["role"], "admin");

    let listed = app.request("GET", "/api/users", None, Some(&token)).await;
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 2);

    let deleted = app
        .request("DELETE", &format!("/api/users/{frank}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_remove_themself() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let me = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    let id = me.body["data"]["id"].as_str().unwrap().to_string();

    let demote = app
        .request(
            "PUT",
            &format!("/api/users/{id}/role"),
            Some(json!({ "role": "user" })),
            Some(&token),
        )
        .await;
    assert_eq!(demote.status, StatusCode::BAD_REQUEST);

    let delete = app
        .request("DELETE", &format!("/api/users/{id}"), None, Some(&token))
        .await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_demotion_applies_to_open_sessions() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let helper_id = app
        .create_user("helper", "password123", UserRole::Admin)
        .await;
    let helper = app.login("helper", "password123").await;

    let response = app.request("GET", "/api/users", None, Some(&helper)).await;
    assert_eq!(response.status, StatusCode::OK);

    app.request(
        "PUT",
        &format!("/api/users/{helper_id}/role"),
        Some(json!({ "role": "user" })),
        Some(&admin),
    )
    .await;

    let response = app.request("GET", "/api/users", None, Some(&helper)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "connected");
}

#[tokio::test]
async fn test_cleanup_sweeps_abandoned_sessions() {
    let app = TestApp::with_config(|config| config.session.ttl_hours = 0).await;
    app.create_user("ivan", "password123", UserRole::User).await;

    // Two logins whose tokens are never presented again.
    app.login("ivan", "password123").await;
    app.login("ivan", "password123").await;

    let removed = app.state.session_cleanup.run_cleanup().await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(app.state.session_cleanup.run_cleanup().await.unwrap(), 0);
}
