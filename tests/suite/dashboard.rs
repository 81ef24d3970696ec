//! End-to-end dashboard lifecycle against a mock backend.

use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use userdash_engine::{DashboardError, Draft, DraftError, FormField, Role};

use crate::common::{
    app_for, mount_alice_backend, mount_failure, mount_status, mount_users, settle,
    start_backend, status_body, user_body,
};

#[tokio::test]
async fn initial_load_shows_status_and_users() {
    let server = start_backend().await;
    mount_alice_backend(&server).await;
    let mut app = app_for(&server);

    app.mount();
    assert!(app.state().loading);
    assert!(settle(&mut app).await);

    let state = app.state();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.api_status.as_ref().map(|s| s.version.as_str()), Some("2.0"));
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.users[0].name, "Alice");
    assert_eq!(state.users[0].role, Role::Admin);
}

#[tokio::test]
async fn mount_twice_loads_once() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("2.0")))
        .expect(1)
        .mount(&server)
        .await;
    mount_users(&server, json!([])).await;
    let mut app = app_for(&server);

    app.mount();
    app.mount();
    assert!(settle(&mut app).await);
    assert!(app.state().users.is_empty());
}

#[tokio::test]
async fn loading_spans_the_slowest_request() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body("2.0"))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    mount_users(&server, json!([])).await;
    let mut app = app_for(&server);

    app.mount();
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.process_completions();
    assert!(app.state().loading, "users alone must not end the load");

    assert!(settle(&mut app).await);
    assert!(!app.state().loading);
    assert!(app.state().api_status.is_some());
}

#[tokio::test]
async fn creating_a_user_appends_it_and_resets_the_form() {
    let server = start_backend().await;
    mount_alice_backend(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(body_json(json!({ "name": "Bob", "email": "b@x.com", "role": "user" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(user_body(2, "Bob", "b@x.com", "user")),
        )
        .expect(1)
        .mount(&server)
        .await;
    let mut app = app_for(&server);

    app.mount();
    settle(&mut app).await;

    app.set_field(FormField::Name, "Bob");
    app.set_field(FormField::Email, "b@x.com");
    app.submit();
    assert!(app.state().submitting);
    assert!(settle(&mut app).await);

    let state = app.state();
    let names: Vec<_> = state.users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob"]);
    assert_eq!(state.draft, Draft::default());
    assert!(!state.submitting);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn failed_create_keeps_the_draft() {
    let server = start_backend().await;
    mount_alice_backend(&server).await;
    mount_failure(&server, "POST", "/api/users", 500).await;
    let mut app = app_for(&server);

    app.mount();
    settle(&mut app).await;

    app.set_field(FormField::Name, "Bob");
    app.set_field(FormField::Email, "b@x.com");
    app.set_field(FormField::Role, "admin");
    let draft = app.state().draft.clone();
    app.submit();
    settle(&mut app).await;

    let state = app.state();
    assert_eq!(state.error, Some(DashboardError::CreateFailed));
    assert_eq!(state.draft, draft);
    assert_eq!(state.users.len(), 1);
}

#[tokio::test]
async fn empty_field_never_reaches_the_backend() {
    let server = start_backend().await;
    mount_alice_backend(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let mut app = app_for(&server);

    app.mount();
    settle(&mut app).await;

    app.set_field(FormField::Name, "Bob");
    app.submit();
    assert_eq!(app.state().validation, Some(DraftError::MissingEmail));
    assert!(!app.state().submitting);
}

#[tokio::test]
async fn fetch_failure_then_retry_recovers() {
    let server = start_backend().await;
    mount_status(&server, "2.0").await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_users(&server, json!([user_body(1, "Alice", "a@x.com", "admin")])).await;
    let mut app = app_for(&server);

    app.mount();
    settle(&mut app).await;
    let state = app.state();
    assert_eq!(state.error, Some(DashboardError::FetchFailed));
    assert!(state.api_status.is_none(), "a half-successful load changes nothing");
    assert!(state.users.is_empty());
    assert!(!state.loading);

    app.retry();
    assert!(app.state().loading);
    settle(&mut app).await;
    let state = app.state();
    assert_eq!(state.error, None);
    assert_eq!(state.users.len(), 1);
}

#[tokio::test]
async fn failed_reload_keeps_what_was_shown() {
    let server = start_backend().await;
    mount_alice_backend(&server).await;
    let mut app = app_for(&server);

    app.mount();
    settle(&mut app).await;
    let before = app.state().users.clone();

    server.reset().await;
    mount_failure(&server, "GET", "/api/status", 500).await;
    mount_users(&server, json!([])).await;

    app.retry();
    settle(&mut app).await;
    let state = app.state();
    assert_eq!(state.error, Some(DashboardError::FetchFailed));
    assert_eq!(state.users, before);
    assert!(state.api_status.is_some());
}

#[tokio::test]
async fn unmount_mid_load_ignores_the_late_response() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body("2.0"))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;
    mount_users(&server, json!([user_body(1, "Alice", "a@x.com", "admin")])).await;
    let mut app = app_for(&server);

    app.mount();
    app.unmount();
    tokio::time::sleep(Duration::from_millis(250)).await;
    app.process_completions();

    let state = app.state();
    assert!(state.users.is_empty());
    assert!(state.api_status.is_none());
    assert_eq!(state.error, None);
    assert_eq!(app.in_flight(), 0);
}

#[tokio::test]
async fn malformed_users_payload_is_a_fetch_failure() {
    let server = start_backend().await;
    mount_status(&server, "2.0").await;
    mount_users(&server, json!({ "users": "not a list" })).await;
    let mut app = app_for(&server);

    app.mount();
    settle(&mut app).await;
    assert_eq!(app.state().error, Some(DashboardError::FetchFailed));
}

#[tokio::test]
async fn loaded_dashboard_renders_alice_and_version() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "version": "2.0",
            "environment": "prod",
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;
    mount_users(&server, json!([user_body(1, "Alice", "a@x.com", "admin")])).await;
    let mut app = app_for(&server);

    app.mount();
    settle(&mut app).await;

    let mut terminal = Terminal::new(TestBackend::new(100, 40)).expect("test backend");
    terminal
        .draw(|frame| userdash_tui::draw(frame, &mut app))
        .expect("draw");
    let buffer = terminal.backend().buffer();
    let screen: String = (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n");

    assert_eq!(screen.matches("Alice").count(), 1);
    assert!(screen.contains("Current Users (1)"));
    assert!(screen.contains("2.0"));
    assert!(screen.contains("prod"));
}
