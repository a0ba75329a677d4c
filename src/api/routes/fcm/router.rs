//! Router for the FCM surface

use axum::{Json, Router, extract::State};

use super::public;
use crate::api::public::{ApiError, SurfaceStatus};
use crate::api::state::SharedState;
use crate::push::{InboundMessage, NotificationPlatform, SubscriptionState};

fn status(state: &SharedState) -> Json<SurfaceStatus> {
    Json(SurfaceStatus::of(&state.messaging, state.platform.permission()))
}

async fn get_status(State(state): State<SharedState>) -> Json<SurfaceStatus> {
    status(&state)
}

async fn check(State(state): State<SharedState>) -> Json<SurfaceStatus> {
    if let SubscriptionState::Subscribed(_) = state.messaging.check_status().await {
        state.bind_foreground();
    }
    status(&state)
}

// Start listening for foreground messages as soon as there's a token
async fn subscribe(State(state): State<SharedState>) -> Result<Json<SurfaceStatus>, ApiError> {
    if let SubscriptionState::Subscribed(token) = state.messaging.subscribe().await? {
        if state.foreground_token().as_deref() != Some(token.as_str()) {
            state.bind_foreground();
        }
    }
    Ok(status(&state))
}

async fn unsubscribe(State(state): State<SharedState>) -> Result<Json<SurfaceStatus>, ApiError> {
    if let SubscriptionState::Unsubscribed = state.messaging.unsubscribe().await? {
        state.unbind_foreground();
    }
    Ok(status(&state))
}

async fn send_test(State(state): State<SharedState>) -> Json<public::TestResponse> {
    Json(public::TestResponse {
        shown: state.messaging.send_test_notification(),
    })
}

async fn copy_token(State(state): State<SharedState>) -> Json<public::CopyResponse> {
    let copied = state.messaging.copy_token(state.clipboard.as_ref()).await;
    Json(public::CopyResponse { copied })
}

// Latest foreground message, if any arrived since subscribing
async fn last_message(State(state): State<SharedState>) -> Json<Option<InboundMessage>> {
    Json(state.messaging.snapshot().last_message)
}

/// Create the FCM router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/status", axum::routing::get(get_status))
        .route("/check", axum::routing::post(check))
        .route("/subscribe", axum::routing::post(subscribe))
        .route("/unsubscribe", axum::routing::post(unsubscribe))
        .route("/test", axum::routing::post(send_test))
        .route("/copy", axum::routing::post(copy_token))
        .route("/message", axum::routing::get(last_message))
}
