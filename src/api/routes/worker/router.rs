//! Router for the background delivery entrypoint. These stand in for the
//! events the service worker receives while no surface is open.

use axum::body::Bytes;
use axum::{Json, Router, extract::State};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::push::InboundMessage;
use crate::worker::{self, ClickOutcome, NotificationClick};

async fn push(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<public::ShownResponse>, ApiError> {
    let data = (!body.is_empty()).then_some(body.as_ref());
    let displayed = worker::handle_push(state.platform.as_ref(), &state.worker, data)?;
    Ok(Json(displayed.into()))
}

async fn message(
    State(state): State<SharedState>,
    Json(message): Json<InboundMessage>,
) -> Result<Json<public::ShownResponse>, ApiError> {
    let displayed =
        worker::handle_background_message(state.platform.as_ref(), &state.worker, &message)?;
    Ok(Json(Some(displayed).into()))
}

async fn notification_click(
    State(state): State<SharedState>,
    Json(click): Json<NotificationClick>,
) -> Result<Json<ClickOutcome>, ApiError> {
    // The headless platform is both the tray and the window clients
    let outcome = worker::handle_notification_click(
        state.platform.as_ref(),
        state.platform.as_ref(),
        &state.worker,
        &click,
    )
    .await?;
    Ok(Json(outcome))
}

/// Create the worker router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/push", axum::routing::post(push))
        .route("/message", axum::routing::post(message))
        .route("/notificationclick", axum::routing::post(notification_click))
}
