//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use photoprint::models::AppConfig;
use photoprint::server::{build_router, create_app_state, AppState};
use photoprint::services::InMemorySessionRegistry;

/// Test application with router, a scratch directory and direct access to
/// the session registry
pub struct TestApp {
    router: axum::Router,
    pub sessions: Arc<InMemorySessionRegistry>,
    /// Holds source images and the output directory; removed on drop
    pub dir: TempDir,
}

impl TestApp {
    /// Create a new test application writing into a temporary directory
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application from `config`, with its output directory
    /// replaced by one inside the scratch directory
    pub fn with_config(config: AppConfig) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig {
            output_dir: dir.path().join("out"),
            ..config
        };

        let state = create_app_state(config);
        let sessions = state.sessions.clone();
        let router = build_router(state);

        Self {
            router,
            sessions,
            dir,
        }
    }

    /// Create state for custom router configuration
    pub fn create_state(output_dir: &Path) -> AppState {
        create_app_state(AppConfig {
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        })
    }

    /// Directory the server saves into
    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let builder = Request::post(path).header("Content-Type", "application/json");
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request(Request::post(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Request::delete(path).body(Body::empty()).unwrap())
            .await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Open a session on `source` and return its id
    pub async fn open_session(&self, source: &Path) -> String {
        let body = serde_json::json!({ "path": source }).to_string();
        let response = self.post_json("/api/sessions", &body).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Body: {}",
            response.text()
        );

        let json: serde_json::Value = response.json();
        json["session"].as_str().unwrap().to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }
}
