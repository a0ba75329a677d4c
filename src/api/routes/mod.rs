//! API routes module

pub mod fcm;
mod notifications;
pub mod webpush;
pub mod worker;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Web Push surface
        .nest("/webpush", webpush::router())
        // FCM surface
        .nest("/fcm", fcm::router())
        // Background delivery entrypoint
        .nest("/worker", worker::router())
        // Notification tray
        .nest("/notifications", notifications::router())
}
