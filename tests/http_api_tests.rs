// Integration tests for the HTTP API
//
// Requests go straight into the router with `oneshot`; no socket is bound.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use smartstudy::audio::UnsupportedInput;
use smartstudy::{
    create_router, AmbientPlayer, AppState, AudioCaptureController, FocusTimerConfig,
    FocusTimerController, LogNotifier, VoiceApiClient,
};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let focus = FocusTimerController::new(FocusTimerConfig::default(), Arc::new(LogNotifier));
    let voice = VoiceApiClient::new("http://127.0.0.1:9", None);
    let capture =
        AudioCaptureController::new(Box::new(UnsupportedInput), Arc::new(voice.clone()));

    create_router(AppState::new(
        focus,
        capture,
        AmbientPlayer::default(),
        voice,
    ))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_focus_start_status_reset() {
    let app = app();

    let (status, body) = send(&app, "GET", "/focus/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "focus");
    assert_eq!(body["remaining_secs"], 1500);
    assert_eq!(body["display"], "25:00");
    assert_eq!(body["is_running"], false);

    let (status, body) = send(&app, "POST", "/focus/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_running"], true);

    let (_, body) = send(&app, "POST", "/focus/pause", None).await;
    assert_eq!(body["is_running"], false);

    let (status, body) = send(&app, "POST", "/focus/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining_secs"], 1500);
    assert_eq!(body["stats"]["completed_sessions"], 0);
}

#[tokio::test]
async fn test_record_start_without_input_is_unavailable() {
    let app = app();

    let (status, body) = send(&app, "POST", "/voice/record/start", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("No microphone backend"));

    let (_, body) = send(&app, "GET", "/voice/status", None).await;
    assert_eq!(body["state"], "error");
    assert_eq!(body["last_error"]["kind"], "device_unavailable");

    let (status, body) = send(&app, "POST", "/voice/record/acknowledge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");
    assert_eq!(body["last_error"], Value::Null);
}

#[tokio::test]
async fn test_record_stop_when_idle() {
    let app = app();

    let (status, body) = send(&app, "POST", "/voice/record/stop", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["bytes"], 0);
}

#[tokio::test]
async fn test_record_pause_when_idle_conflicts() {
    let app = app();

    let (status, _) = send(&app, "POST", "/voice/record/pause", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", "/voice/record/resume", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_library_backend_unreachable() {
    let app = app();

    let (status, body) = send(&app, "GET", "/voice/library?query=cells", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_ambient_controls() {
    let app = app();

    let (status, body) = send(&app, "GET", "/ambient", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player"]["selected"], "library");
    assert_eq!(body["player"]["volume"], 50);
    assert_eq!(body["sounds"].as_array().unwrap().len(), 4);

    let (status, body) = send(
        &app,
        "POST",
        "/ambient/sound",
        Some(serde_json::json!({ "sound": "Rain" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player"]["selected"], "rain");
    assert_eq!(body["player"]["playing"], true);

    let (_, body) = send(
        &app,
        "POST",
        "/ambient/volume",
        Some(serde_json::json!({ "volume": 200 })),
    )
    .await;
    assert_eq!(body["player"]["volume"], 100);

    let (_, body) = send(&app, "POST", "/ambient/toggle", None).await;
    assert_eq!(body["player"]["playing"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/ambient/sound",
        Some(serde_json::json!({ "sound": "thunderstorm" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
