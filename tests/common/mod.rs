//! Shared test utilities and fixtures
//!
//! A wiremock backend speaking the dashboard's three endpoints.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use userdash_engine::{App, BackendClient, UiOptions};

/// Upper bound for any single request in these tests.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn start_backend() -> MockServer {
    MockServer::start().await
}

pub fn app_for(server: &MockServer) -> App {
    let client = BackendClient::new(&server.uri(), None).expect("mock server URL is valid");
    App::new(client, UiOptions::default())
}

/// Wait for the next request to finish and fold it into the app.
pub async fn settle(app: &mut App) -> bool {
    tokio::time::timeout(COMPLETION_TIMEOUT, app.next_completion())
        .await
        .expect("request did not complete in time")
}

pub fn status_body(version: &str) -> Value {
    json!({
        "message": "Backend is running",
        "version": version,
        "environment": "development",
        "timestamp": "2024-01-01T00:00:00Z"
    })
}

pub fn user_body(id: i64, name: &str, email: &str, role: &str) -> Value {
    json!({ "id": id, "name": name, "email": email, "role": role })
}

pub async fn mount_status(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(version)))
        .mount(server)
        .await;
}

pub async fn mount_users(server: &MockServer, users: Value) {
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users))
        .mount(server)
        .await;
}

pub async fn mount_failure(server: &MockServer, http_method: &str, endpoint: &str, status: u16) {
    Mock::given(method(http_method))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_string("backend exploded"))
        .mount(server)
        .await;
}

/// Status plus a single admin, Alice.
pub async fn mount_alice_backend(server: &MockServer) {
    mount_status(server, "2.0").await;
    mount_users(
        server,
        json!([user_body(1, "Alice", "a@x.com", "admin")]),
    )
    .await;
}
