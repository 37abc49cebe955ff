//! Integration tests for the public download endpoint.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use helpers::{TestApp, link_id};

const ZIP_BYTES: &[u8] = b"PK\x03\x04 not really a zip";

fn landing_page(download_link: &str, metadata: &str) -> String {
    let escaped = download_link.replace('/', "\\/");
    format!(
        r#"<html><head><script>var cfg = {{"theme":"dark"}};</script>
<script type="text/javascript">window.__data = {{"downloadlink":"{escaped}","metadata":{metadata}}};</script>
</head><body>Preparing your download</body></html>"#
    )
}

#[tokio::test]
async fn test_direct_binary_respects_download_limit() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/report.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/zip")
                .set_body_bytes(ZIP_BYTES),
        )
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(
            &token,
            json!({
                "original_url": format!("{}/files/report.zip", upstream.uri()),
                "max_downloads": 1,
            }),
        )
        .await;
    let id = link_id(&link);

    let first = app
        .request("GET", &format!("/download/{id}"), None, None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.bytes.as_ref(), ZIP_BYTES);
    assert_eq!(first.header("content-type"), Some("application/zip"));
    assert!(
        first
            .header("content-disposition")
            .is_some_and(|v| v.contains("filename=\"report.zip\""))
    );

    let settled = app
        .wait_for_link(id, |l| l.current_downloads == 1 && !l.is_active)
        .await;
    assert_eq!(settled.remaining_downloads(), Some(0));

    let second = app
        .request("GET", &format!("/download/{id}"), None, None)
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body["error"], "Download limit reached");
    assert_eq!(app.link(id).await.current_downloads, 1);
}

#[tokio::test]
async fn test_upstream_content_disposition_names_the_file() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .insert_header("content-disposition", "attachment; filename=\"Q3 summary.pdf\"")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(&token, json!({ "original_url": format!("{}/get", upstream.uri()) }))
        .await;

    let response = app
        .request("GET", &format!("/download/{}", link_id(&link)), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header("content-disposition")
            .is_some_and(|v| v.contains("Q3 summary.pdf"))
    );
}

#[tokio::test]
async fn test_landing_page_link_is_extracted_and_streamed() {
    let upstream = MockServer::start().await;
    let real = format!("{}/dl/abc123/real.bin", upstream.uri());

    Mock::given(method("GET"))
        .and(path("/file/abc123/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(landing_page(&real, r#"{"name":"report.pdf","size":8}"#), "text/html; charset=utf-8"),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/abc123/real.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(
            &token,
            json!({ "original_url": format!("{}/file/abc123/report", upstream.uri()) }),
        )
        .await;

    let response = app
        .request("GET", &format!("/download/{}", link_id(&link)), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes.as_ref(), b"%PDF-1.7");
    assert!(
        response
            .header("content-disposition")
            .is_some_and(|v| v.contains("filename=\"report.pdf\""))
    );
}

#[tokio::test]
async fn test_unparsable_metadata_falls_back_to_url_filename() {
    let upstream = MockServer::start().await;
    let real = format!("{}/dl/blob", upstream.uri());

    Mock::given(method("GET"))
        .and(path("/file/xyz/archive"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(landing_page(&real, "{broken"), "text/html"),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/blob"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(
            &token,
            json!({ "original_url": format!("{}/file/xyz/archive", upstream.uri()) }),
        )
        .await;

    let response = app
        .request("GET", &format!("/download/{}", link_id(&link)), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes.as_ref(), b"data");
    assert!(
        response
            .header("content-disposition")
            .is_some_and(|v| v.contains("filename=\"archive\""))
    );
}

#[tokio::test]
async fn test_html_without_marker_is_delivered_as_page() {
    let upstream = MockServer::start().await;
    let page = "<html><body>Just a page</body></html>";
    Mock::given(method("GET"))
        .and(path("/pages/landing"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page, "text/html"),
        )
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(
            &token,
            json!({ "original_url": format!("{}/pages/landing", upstream.uri()) }),
        )
        .await;
    let id = link_id(&link);

    let response = app
        .request("GET", &format!("/download/{id}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes.as_ref(), page.as_bytes());
    assert!(
        response
            .header("content-type")
            .is_some_and(|v| v.starts_with("text/html"))
    );
    assert!(
        response
            .header("content-disposition")
            .is_some_and(|v| v.contains("filename=\"landing.html\""))
    );

    // Served pages still count as downloads.
    app.wait_for_link(id, |l| l.current_downloads == 1).await;
}

#[tokio::test]
async fn test_extracted_link_redirect_is_relayed() {
    let upstream = MockServer::start().await;
    let real = format!("{}/dl/moved", upstream.uri());

    Mock::given(method("GET"))
        .and(path("/file/moved"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(landing_page(&real, r#"{"name":"moved.iso"}"#), "text/html"),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/cdn/moved.iso"))
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(
            &token,
            json!({ "original_url": format!("{}/file/moved", upstream.uri()) }),
        )
        .await;

    let response = app
        .request("GET", &format!("/download/{}", link_id(&link)), None, None)
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.header("location"),
        Some(format!("{}/cdn/moved.iso", upstream.uri()).as_str())
    );
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new().await;

    let unknown = app
        .request("GET", &format!("/download/{}", Uuid::new_v4()), None, None)
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["error"], "Link not found");

    let malformed = app.request("GET", "/download/not-a-uuid", None, None).await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
    assert_eq!(malformed.body["error"], "Link not found");
}

#[tokio::test]
async fn test_expired_link_is_rejected_and_deactivated() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"never".to_vec()))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(
            &token,
            json!({
                "original_url": format!("{}/f.bin", upstream.uri()),
                "expiration_hours": 1,
            }),
        )
        .await;
    let id = link_id(&link);

    sqlx::query("UPDATE links SET expires_at = ? WHERE id = ?")
        .bind(Utc::now() - ChronoDuration::minutes(5))
        .bind(id)
        .execute(app.db_pool.pool())
        .await
        .unwrap();

    let response = app
        .request("GET", &format!("/download/{id}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Link has expired");

    let link = app.wait_for_link(id, |l| !l.is_active).await;
    assert_eq!(link.current_downloads, 0);
}

#[tokio::test]
async fn test_deactivated_link_is_inactive() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(&token, json!({ "original_url": "http://127.0.0.1:9/f.bin" }))
        .await;
    let id = link_id(&link);

    let off = app
        .request("POST", &format!("/api/links/{id}/deactivate"), None, Some(&token))
        .await;
    assert_eq!(off.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("/download/{id}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Link is inactive");
}

#[tokio::test]
async fn test_upstream_error_status_is_fetch_failure() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream)
        .await;

    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let link = app
        .create_link(&token, json!({ "original_url": format!("{}/gone.bin", upstream.uri()) }))
        .await;

    let response = app
        .request("GET", &format!("/download/{}", link_id(&link)), None, None)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Failed to fetch file");
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"late".to_vec())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&upstream)
        .await;

    let app = TestApp::with_config(|c| c.proxy.timeout_seconds = 1).await;
    let token = app.admin_token().await;
    let link = app
        .create_link(&token, json!({ "original_url": format!("{}/slow.bin", upstream.uri()) }))
        .await;

    let response = app
        .request("GET", &format!("/download/{}", link_id(&link)), None, None)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Download timeout");
}
