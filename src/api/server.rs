use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::{AppState, SharedState};
use crate::core::AppConfig;
use crate::jobs::{RefreshMessagingToken, spawn_periodic_job};
use crate::push::{Permission, SubscriptionState};

pub fn app(shared_state: SharedState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(
    host: String,
    port: String,
    config: AppConfig,
    permission_answer: Permission,
    secure_clipboard: bool,
) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let refresh_every = config.token_refresh_interval;
    let shared_state: SharedState = Arc::new(AppState::headless(
        config,
        permission_answer,
        secure_clipboard,
    ));

    // Same as mounting both surfaces: pick up whatever already exists
    shared_state.web_push.check_status().await;
    if let SubscriptionState::Subscribed(_) = shared_state.messaging.check_status().await {
        shared_state.bind_foreground();
    }

    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    spawn_periodic_job(
        Arc::clone(&shared_state),
        RefreshMessagingToken {
            every: refresh_every,
        },
    );

    axum::serve(listener, app).await?;
    Ok(())
}
