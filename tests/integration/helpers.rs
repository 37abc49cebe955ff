//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tracklink_api::{AppState, build_app, build_state};
use tracklink_core::config::AppConfig;
use tracklink_database::DatabasePool;
use tracklink_entity::link::Link;
use tracklink_entity::user::UserRole;
use tracklink_service::CreateUserRequest;

pub const PUBLIC_URL: &str = "http://tracklink.test";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct service access
    pub state: AppState,
    /// Database pool for direct queries
    pub db_pool: DatabasePool,
}

impl TestApp {
    /// Create a new test application over a fresh in-memory database.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the default test config.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.server.public_url = Some(PUBLIC_URL.to_string());
        // wiremock servers listen on 127.0.0.1
        config.proxy.landing_page.domains = vec!["127.0.0.1".to_string()];
        config.proxy.timeout_seconds = 5;
        adjust(&mut config);

        let db_pool = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        tracklink_database::migration::run_migrations(db_pool.pool())
            .await
            .expect("Failed to run migrations");

        let state = build_state(config, db_pool.clone()).expect("Failed to build state");
        let router = build_app(state.clone());

        Self {
            router,
            state,
            db_pool,
        }
    }

    /// Create a user directly through the service.
    pub async fn create_user(&self, username: &str, password: &str, role: UserRole) -> Uuid {
        self.state
            .user_service
            .create_unchecked(CreateUserRequest {
                username: username.to_string(),
                password: password.to_string(),
                role,
            })
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Log in and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response = self
            .request("POST", "/api/auth/login", Some(body), None)
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["data"]["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Admin account plus its token.
    pub async fn admin_token(&self) -> String {
        self.create_user("admin", "admin-password", UserRole::Admin)
            .await;
        self.login("admin", "admin-password").await
    }

    /// Create a link through the API and return its `data` object.
    pub async fn create_link(&self, token: &str, body: Value) -> Value {
        let response = self
            .request("POST", "/api/links", Some(body), Some(token))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "link creation failed: {}",
            response.body
        );
        response.body["data"].clone()
    }

    /// Read a link straight from the database.
    pub async fn link(&self, id: Uuid) -> Link {
        sqlx::query_as::<_, Link>("SELECT * FROM links WHERE id = ?")
            .bind(id)
            .fetch_one(self.db_pool.pool())
            .await
            .expect("Link row missing")
    }

    /// Wait until the detached bookkeeping task has settled on `predicate`.
    pub async fn wait_for_link(&self, id: Uuid, predicate: impl Fn(&Link) -> bool) -> Link {
        for _ in 0..100 {
            let link = self.link(id).await;
            if predicate(&link) {
                return link;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("link {id} never reached the expected state");
    }

    /// Make a JSON request to the app.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(b) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_string(&b).expect("Failed to serialize body"))
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("Failed to build request");
        self.send(request).await
    }

    /// Send a prepared request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Parsed test response
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Bytes,
    /// Body parsed as JSON, or `Null`
    pub body: Value,
}

impl TestResponse {
    /// Header value as a string, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Parse the `id` of a link response.
pub fn link_id(link: &Value) -> Uuid {
    link["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("link response has no id")
}
