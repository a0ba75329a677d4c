//! Router for the Web Push surface

use axum::{Json, Router, extract::State};
use serde_json::Value;

use crate::api::public::{ApiError, SurfaceStatus};
use crate::api::state::SharedState;
use crate::push::NotificationPlatform;

fn status(state: &SharedState) -> Json<SurfaceStatus> {
    Json(SurfaceStatus::of(&state.web_push, state.platform.permission()))
}

async fn get_status(State(state): State<SharedState>) -> Json<SurfaceStatus> {
    status(&state)
}

// Look for an existing subscription, as on page load
async fn check(State(state): State<SharedState>) -> Json<SurfaceStatus> {
    state.web_push.check_status().await;
    status(&state)
}

async fn subscribe(State(state): State<SharedState>) -> Result<Json<SurfaceStatus>, ApiError> {
    state.web_push.subscribe().await?;
    Ok(status(&state))
}

async fn unsubscribe(State(state): State<SharedState>) -> Result<Json<SurfaceStatus>, ApiError> {
    state.web_push.unsubscribe().await?;
    Ok(status(&state))
}

async fn send_test(State(state): State<SharedState>) -> Json<Value> {
    let shown = state.web_push.send_test_notification();
    Json(serde_json::json!({ "shown": shown }))
}

// The subscription as the browser reports it, ready to hand to a server
async fn subscription(State(state): State<SharedState>) -> Json<Option<Value>> {
    Json(state.web_push.subscription().map(|s| s.display_form()))
}

/// Create the Web Push router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/status", axum::routing::get(get_status))
        .route("/check", axum::routing::post(check))
        .route("/subscribe", axum::routing::post(subscribe))
        .route("/unsubscribe", axum::routing::post(unsubscribe))
        .route("/test", axum::routing::post(send_test))
        .route("/subscription", axum::routing::get(subscription))
}
