use async_trait::async_trait;
use std::time::Duration;

use crate::api::SharedState;
use crate::push::PushError;

/// Periodically asks the messaging SDK for the current token. The SDK
/// has no refresh callback, so a changed token is only noticed by
/// polling, and the foreground listener has to follow it.
#[derive(Debug)]
pub struct RefreshMessagingToken {
    pub every: Duration,
}

#[async_trait]
impl crate::jobs::PeriodicJob for RefreshMessagingToken {
    fn interval(&self) -> Duration {
        self.every
    }

    async fn run_job(&self, state: &SharedState) {
        tracing::debug!("Checking messaging token");

        match state.messaging.refresh_token().await {
            Ok(Some(_)) => {
                tracing::info!("Messaging token changed, rebinding foreground listener");
                state.bind_foreground();
            }
            Ok(None) => {}
            Err(PushError::Busy) => {
                tracing::debug!("Messaging surface busy, skipping token check");
            }
            Err(e) => {
                tracing::error!("Failed to refresh messaging token: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::AppState;
    use crate::core::{AppConfig, FirebaseConfig};
    use crate::jobs::PeriodicJob;
    use crate::platform::{HeadlessClipboard, HeadlessPlatform, HeadlessPushService};
    use crate::push::{InboundMessage, Permission, SubscriptionState};

    const VAPID_KEY: &str =
        "BJ8YKZk_DlJuAGSrq1Q4Q2U0vJ0KrjXZZ4B7BQfF5Jj4Z1QhLwUzKwOqXd6Y3aGbHwK1FgPjXzY9NhBvZVd-zKo";

    #[tokio::test]
    async fn it_rebinds_after_the_token_changes() {
        let mut config = AppConfig::new(VAPID_KEY);
        config.firebase = Some(FirebaseConfig {
            api_key: "key".to_string(),
            auth_domain: "demo.firebaseapp.com".to_string(),
            project_id: "demo".to_string(),
            storage_bucket: "demo.appspot.com".to_string(),
            messaging_sender_id: "1234".to_string(),
            app_id: "1:1234:web:abcd".to_string(),
        });
        let platform = Arc::new(HeadlessPlatform::new(Permission::Granted));
        let messaging = Arc::new(HeadlessPushService::messaging());
        let state: SharedState = Arc::new(AppState::new(
            config,
            platform.clone(),
            Arc::new(HeadlessClipboard::new(true)),
            Arc::new(HeadlessPushService::web_push()),
            messaging.clone(),
        ));

        let SubscriptionState::Subscribed(old) = state.messaging.subscribe().await.unwrap() else {
            panic!("expected subscribed");
        };
        state.bind_foreground();

        let job = RefreshMessagingToken {
            every: Duration::from_secs(60),
        };
        job.run_job(&state).await;
        assert_eq!(state.foreground_token(), Some(old.clone()));

        let rotated = messaging.rotate_token().unwrap();
        job.run_job(&state).await;
        assert_eq!(state.foreground_token(), Some(rotated.clone()));

        assert_eq!(
            messaging.deliver(&rotated, InboundMessage::notification("after", "refresh")),
            1
        );
        assert_eq!(platform.notifications()[0].title, "after");
    }
}
