//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

use crate::push::{
    InboundMessage, Permission, PushError, SubscriptionObserver, SubscriptionState, SurfaceKind,
};

// Errors

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // A surface refusing to start a second operation is the client's
        // problem, not ours
        if let Some(PushError::Busy) = self.0.downcast_ref::<PushError>() {
            tracing::debug!("{}", self.0);
            return (StatusCode::CONFLICT, self.0.to_string()).into_response();
        }

        // Always log the error
        tracing::error!("{}", self.0);

        // Respond with an error status
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// What a surface renders: its status plus whatever detail it shows.
#[derive(Debug, Serialize)]
pub struct SurfaceStatus {
    pub kind: SurfaceKind,
    pub state: SubscriptionState,
    pub supported: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub permission: Permission,
    pub subscription: Option<serde_json::Value>,
    pub last_message: Option<InboundMessage>,
}

impl SurfaceStatus {
    pub fn of(observer: &SubscriptionObserver, permission: Permission) -> Self {
        let snapshot = observer.snapshot();
        Self {
            kind: observer.kind(),
            state: snapshot.state(),
            supported: snapshot.supported,
            is_loading: snapshot.is_loading,
            error: snapshot.error,
            permission,
            subscription: snapshot.subscription.map(|s| s.display_form()),
            last_message: snapshot.last_message,
        }
    }
}

// Re-export public types from each route

pub mod fcm {
    pub use crate::api::routes::fcm::public::*;
}

pub mod worker {
    pub use crate::api::routes::worker::public::*;
}
