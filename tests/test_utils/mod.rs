//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::{Router, body::Body, http::Request};

use pushbell::api::{AppState, SharedState, app};
use pushbell::core::{AppConfig, FirebaseConfig};
use pushbell::platform::{HeadlessClipboard, HeadlessPlatform, HeadlessPushService};
use pushbell::push::{Capabilities, KeyBytes, Permission, codec};

pub const VAPID_KEY: &str =
    "BJ8YKZk_DlJuAGSrq1Q4Q2U0vJ0KrjXZZ4B7BQfF5Jj4Z1QhLwUzKwOqXd6Y3aGbHwK1FgPjXzY9NhBvZVd-zKo";

/// The router plus handles on the headless platform behind it, so tests
/// can play the part of the push backend.
pub struct TestApp {
    pub app: Router,
    pub state: SharedState,
    pub platform: Arc<HeadlessPlatform>,
    pub clipboard: Arc<HeadlessClipboard>,
    pub web_push: Arc<HeadlessPushService>,
    pub messaging: Arc<HeadlessPushService>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::new(VAPID_KEY);
    config.welcome_delay = None;
    config.firebase = Some(FirebaseConfig {
        api_key: String::from("test-api-key"),
        auth_domain: String::from("test.firebaseapp.com"),
        project_id: String::from("test"),
        storage_bucket: String::from("test.firebasestorage.app"),
        messaging_sender_id: String::from("1234567890"),
        app_id: String::from("1:1234567890:web:abcdef"),
    });
    config
}

/// Creates a test application where the user answers the permission
/// prompt with `answer`.
pub fn test_app_with(answer: Permission, capabilities: Capabilities) -> TestApp {
    let platform = Arc::new(HeadlessPlatform::new(answer).with_capabilities(capabilities));
    let clipboard = Arc::new(HeadlessClipboard::new(true));
    let web_push = Arc::new(HeadlessPushService::web_push());
    let messaging = Arc::new(HeadlessPushService::messaging());

    let state: SharedState = Arc::new(AppState::new(
        test_config(),
        platform.clone(),
        clipboard.clone(),
        web_push.clone(),
        messaging.clone(),
    ));

    TestApp {
        app: app(Arc::clone(&state)),
        state,
        platform,
        clipboard,
        web_push,
        messaging,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(Permission::Granted, Capabilities::all())
}

pub fn vapid_key_bytes() -> KeyBytes {
    codec::decode(VAPID_KEY).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}
