//! Integration tests for link management.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use helpers::{PUBLIC_URL, TestApp, link_id};

#[tokio::test]
async fn test_create_and_get_link() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let link = app
        .create_link(
            &token,
            json!({
                "title": "  Quarterly report ",
                "original_url": "https://files.example.com/q3.pdf",
                "max_downloads": 5,
                "expiration_hours": 48,
            }),
        )
        .await;
    let id = link_id(&link);

    assert_eq!(link["title"], "Quarterly report");
    assert_eq!(link["status"], "active");
    assert_eq!(link["current_downloads"], 0);
    assert_eq!(link["remaining_downloads"], 5);
    assert_eq!(link["download_url"], format!("{PUBLIC_URL}/download/{id}"));
    assert!(link["expires_at"].is_string());

    let fetched = app
        .request("GET", &format!("/api/links/{id}"), None, Some(&token))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["original_url"], "https://files.example.com/q3.pdf");
}

#[tokio::test]
async fn test_create_link_validation() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    for body in [
        json!({ "original_url": "ftp://files.example.com/a.bin" }),
        json!({ "original_url": "not a url" }),
        json!({ "original_url": "" }),
        json!({ "original_url": "https://x.test/a", "max_downloads": 0 }),
        json!({ "original_url": "https://x.test/a", "expiration_hours": -1 }),
    ] {
        let response = app
            .request("POST", "/api/links", Some(body.clone()), Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert_eq!(response.body["code"], "VALIDATION");
    }
}

#[tokio::test]
async fn test_links_require_authentication() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/links", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/links", None, Some("deadbeef"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let first = app
        .create_link(&token, json!({ "original_url": "https://x.test/1" }))
        .await;
    let second = app
        .create_link(&token, json!({ "original_url": "https://x.test/2" }))
        .await;

    let response = app.request("GET", "/api/links", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<_> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(link_id)
        .collect();
    assert_eq!(ids, vec![link_id(&second), link_id(&first)]);
}

#[tokio::test]
async fn test_update_clears_quota_and_refuses_exhausted_reactivation() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(
            &token,
            json!({ "original_url": "https://x.test/a", "max_downloads": 1 }),
        )
        .await;
    let id = link_id(&link);

    sqlx::query("UPDATE links SET current_downloads = 1, is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(app.db_pool.pool())
        .await
        .unwrap();

    let refused = app
        .request(
            "PUT",
            &format!("/api/links/{id}"),
            Some(json!({ "is_active": true })),
            Some(&token),
        )
        .await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
    assert!(!app.link(id).await.is_active);

    // Lifting the cap in the same edit makes reactivation legal.
    let allowed = app
        .request(
            "PUT",
            &format!("/api/links/{id}"),
            Some(json!({ "is_active": true, "max_downloads": null, "title": "Unlimited" })),
            Some(&token),
        )
        .await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body["data"]["status"], "active");
    assert_eq!(allowed.body["data"]["max_downloads"], serde_json::Value::Null);
    assert_eq!(allowed.body["data"]["title"], "Unlimited");
}

#[tokio::test]
async fn test_reset_downloads_reactivates() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(
            &token,
            json!({ "original_url": "https://x.test/a", "max_downloads": 2 }),
        )
        .await;
    let id = link_id(&link);

    sqlx::query("UPDATE links SET current_downloads = 2, is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(app.db_pool.pool())
        .await
        .unwrap();

    let response = app
        .request("POST", &format!("/api/links/{id}/reset"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["current_downloads"], 0);
    assert_eq!(response.body["data"]["is_active"], true);
    assert_eq!(response.body["data"]["status"], "active");
}

#[tokio::test]
async fn test_deactivate_and_delete() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(&token, json!({ "original_url": "https://x.test/a" }))
        .await;
    let id = link_id(&link);

    let response = app
        .request("POST", &format!("/api/links/{id}/deactivate"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "deactivated");

    let response = app
        .request("DELETE", &format!("/api/links/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("/api/links/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("DELETE", &format!("/api/links/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_check_records_probe_without_touching_activation() {
    let upstream = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/alive.bin"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&upstream)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/dead.bin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let alive = app
        .create_link(&token, json!({ "original_url": format!("{}/alive.bin", upstream.uri()) }))
        .await;
    let dead = app
        .create_link(&token, json!({ "original_url": format!("{}/dead.bin", upstream.uri()) }))
        .await;

    let response = app
        .request(
            "POST",
            &format!("/api/links/{}/check", link_id(&dead)),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_valid"], false);
    assert_eq!(response.body["data"]["status_code"], 404);
    assert!(
        response.body["data"]["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("HTTP 404"))
    );

    let stored = app.link(link_id(&dead)).await;
    assert_eq!(stored.is_valid, Some(false));
    assert!(stored.last_checked.is_some());
    assert!(stored.is_active);

    let response = app
        .request("POST", "/api/links/check-all", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let results = response.body["data"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    let alive_result = results
        .iter()
        .find(|r| r["link_id"] == alive["id"])
        .unwrap();
    assert_eq!(alive_result["is_valid"], true);
}

#[tokio::test]
async fn test_refresh_reactivates_valid_link() {
    let upstream = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(&token, json!({ "original_url": format!("{}/f.bin", upstream.uri()) }))
        .await;
    let id = link_id(&link);

    app.request("POST", &format!("/api/links/{id}/deactivate"), None, Some(&token))
        .await;

    let response = app
        .request("POST", &format!("/api/links/{id}/refresh"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_active"], true);
    assert_eq!(response.body["data"]["is_valid"], true);
}

#[tokio::test]
async fn test_plain_user_can_manage_links() {
    let app = TestApp::new().await;
    app.create_user("editor", "editor-password", tracklink_entity::user::UserRole::User)
        .await;
    let token = app.login("editor", "editor-password").await;

    let link = app
        .create_link(&token, json!({ "original_url": "https://x.test/a" }))
        .await;
    assert_eq!(link["status"], "active");
}
