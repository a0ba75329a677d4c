//! Router for the notification tray

use axum::{Json, Router, extract::State};

use crate::api::state::SharedState;
use crate::push::ShownNotification;

async fn list(State(state): State<SharedState>) -> Json<Vec<ShownNotification>> {
    Json(state.platform.notifications())
}

/// Create the notifications router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(list))
}
