use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use menubar_countdown::{
    api::create_router, clock::SystemClock, preferences::Preferences, state::AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    state: Arc<AppState>,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let state = Arc::new(AppState::new(
            20554,
            "127.0.0.1".to_string(),
            Arc::new(SystemClock::new()),
            Preferences::in_memory(),
        ));
        let router = create_router(Arc::clone(&state));
        Self { state, router }
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let val = if bytes.is_empty() {
            json!(null)
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, val)
    }

    async fn request_raw(
        &self,
        path: &str,
        content_type: Option<&str>,
        body: &'static str,
    ) -> StatusCode {
        let mut builder = Request::builder().method("POST").uri(path);
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let req = builder.body(Body::from(body)).unwrap();
        self.router.clone().oneshot(req).await.unwrap().status()
    }

    async fn request_expect(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Value {
        let (status, val) = self.request(method, path, body).await;
        assert_eq!(status, expected, "{method} {path} returned {val}");
        val
    }
}

#[tokio::test]
async fn health_and_initial_status() {
    let app = TestApp::new();
    let health = app.request_expect("GET", "/health", None, StatusCode::OK).await;
    assert_eq!(health["status"], "ok");

    let status = app.request_expect("GET", "/status", None, StatusCode::OK).await;
    assert_eq!(status["countdown"]["phase"], "idle");
    assert_eq!(status["countdown"]["title"], Value::Null);
    assert_eq!(status["port"], 20554);
}

#[tokio::test(start_paused = true)]
async fn countdown_lifecycle_over_http() {
    let app = TestApp::new();

    let started = app
        .request_expect("POST", "/start", Some(json!({"seconds": 10})), StatusCode::OK)
        .await;
    assert_eq!(started["countdown"]["phase"], "running");
    assert_eq!(started["countdown"]["remaining_seconds"], 10);
    assert_eq!(started["countdown"]["title"], "00:00:10");

    tokio::time::sleep(Duration::from_millis(3_900)).await;
    let paused = app.request_expect("POST", "/pause", None, StatusCode::OK).await;
    assert_eq!(paused["countdown"]["phase"], "paused");
    assert_eq!(paused["countdown"]["remaining_seconds"], 7);
    assert_eq!(paused["countdown"]["is_paused"], true);
    assert_eq!(paused["countdown"]["can_resume"], true);

    let resumed = app.request_expect("POST", "/resume", None, StatusCode::OK).await;
    assert_eq!(resumed["countdown"]["remaining_seconds"], 7);

    tokio::time::sleep(Duration::from_secs(8)).await;
    let status = app.request_expect("GET", "/status", None, StatusCode::OK).await;
    assert_eq!(status["countdown"]["phase"], "expired");
    assert_eq!(status["countdown"]["has_expired"], true);
    assert_eq!(status["countdown"]["alert_visible"], true);
    assert_eq!(status["countdown"]["blinking"], true);

    let dismissed = app.request_expect("POST", "/dismiss", None, StatusCode::OK).await;
    assert_eq!(dismissed["countdown"]["phase"], "idle");
    assert_eq!(dismissed["countdown"]["alert_visible"], false);
    assert_eq!(
        app.state.get_last_action().0.as_deref(),
        Some("dismiss")
    );
}

#[tokio::test]
async fn invalid_commands_are_rejected() {
    let app = TestApp::new();

    let unprocessable = StatusCode::UNPROCESSABLE_ENTITY;
    let err = app
        .request_expect("POST", "/start", Some(json!({"seconds": 0})), unprocessable)
        .await;
    assert_eq!(err["status"], "error");
    app.request_expect("POST", "/start", Some(json!({"minutes": -1})), unprocessable)
        .await;

    app.request_expect("POST", "/pause", None, StatusCode::CONFLICT).await;
    app.request_expect("POST", "/resume", None, StatusCode::CONFLICT).await;
    app.request_expect("POST", "/dismiss", None, StatusCode::CONFLICT).await;

    let status = app.request_expect("GET", "/status", None, StatusCode::OK).await;
    assert_eq!(status["countdown"]["phase"], "idle");
    assert_eq!(status["last_action"], Value::Null);
}

#[tokio::test]
async fn unreadable_start_bodies_never_start_a_countdown() {
    let app = TestApp::new();
    let json = Some("application/json");

    let cases = [
        (json, r#"{"seconds":"10"}"#, StatusCode::BAD_REQUEST),
        (json, r#"{"secs":0}"#, StatusCode::BAD_REQUEST),
        (json, "not json", StatusCode::BAD_REQUEST),
        (json, "{}", StatusCode::UNPROCESSABLE_ENTITY),
        (None, r#"{"seconds":0}"#, StatusCode::UNPROCESSABLE_ENTITY),
        (Some("text/plain"), "not json", StatusCode::BAD_REQUEST),
    ];
    for (content_type, body, expected) in cases {
        let status = app.request_raw("/start", content_type, body).await;
        assert_eq!(status, expected, "body {body:?}");

        let snapshot = app.state.snapshot().unwrap();
        assert_eq!(snapshot.phase.as_str(), "idle", "body {body:?} started a countdown");
        assert_eq!(snapshot.session, 0);
    }
}

#[tokio::test]
async fn start_body_without_content_type_is_still_honoured() {
    let app = TestApp::new();
    let status = app.request_raw("/start", None, r#"{"seconds":42}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.state.snapshot().unwrap().setting_seconds, 42);
}

#[tokio::test]
async fn stop_prevents_resume() {
    let app = TestApp::new();
    app.request_expect("POST", "/start", Some(json!({"hours": 1})), StatusCode::OK)
        .await;
    app.request_expect("POST", "/pause", None, StatusCode::OK).await;
    let stopped = app.request_expect("POST", "/stop", None, StatusCode::OK).await;
    assert_eq!(stopped["countdown"]["phase"], "idle");
    assert_eq!(stopped["countdown"]["can_resume"], false);
    app.request_expect("POST", "/resume", None, StatusCode::CONFLICT).await;
}

#[tokio::test]
async fn start_without_body_uses_preferences() {
    let app = TestApp::new();
    app.request_expect("PUT", "/preferences/timer-minutes", Some(json!(2)), StatusCode::OK)
        .await;
    app.request_expect("PUT", "/preferences/timer-seconds", Some(json!(5)), StatusCode::OK)
        .await;

    let started = app.request_expect("POST", "/start", None, StatusCode::OK).await;
    assert_eq!(started["countdown"]["setting_seconds"], 125);

    let restarted = app.request_expect("POST", "/restart", None, StatusCode::OK).await;
    assert_eq!(restarted["countdown"]["phase"], "running");
    assert_eq!(restarted["countdown"]["setting_seconds"], 125);
}

#[tokio::test]
async fn preferences_are_validated() {
    let app = TestApp::new();

    let all = app.request_expect("GET", "/preferences", None, StatusCode::OK).await;
    assert_eq!(all["preferences"]["timer-minutes"], 25);
    assert_eq!(all["preferences"]["show-seconds-in-menubar"], true);

    app.request_expect("GET", "/preferences/timer-days", None, StatusCode::NOT_FOUND)
        .await;
    app.request_expect(
        "PUT",
        "/preferences/timer-hours",
        Some(json!(100)),
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    app.request_expect(
        "PUT",
        "/preferences/play-alert-sound",
        Some(json!("loud")),
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;

    app.request_expect(
        "PUT",
        "/preferences/announcement-text",
        Some(json!("Time to stretch")),
        StatusCode::OK,
    )
    .await;
    let text = app
        .request_expect("GET", "/preferences/announcement-text", None, StatusCode::OK)
        .await;
    assert_eq!(text["value"], "Time to stretch");
}

#[tokio::test(start_paused = true)]
async fn notification_click_acknowledges_expiry() {
    let app = TestApp::new();
    app.request_expect("POST", "/start", Some(json!({"seconds": 1})), StatusCode::OK)
        .await;
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    let clicked = app
        .request_expect("POST", "/notification-clicked", None, StatusCode::OK)
        .await;
    assert_eq!(clicked["countdown"]["phase"], "idle");
    assert_eq!(clicked["countdown"]["alert_visible"], false);
}

#[tokio::test]
async fn quit_requests_shutdown() {
    let app = TestApp::new();
    app.request_expect("POST", "/quit", None, StatusCode::OK).await;
    tokio::time::timeout(Duration::from_secs(1), app.state.shutdown_requested())
        .await
        .expect("shutdown was not requested");
}
