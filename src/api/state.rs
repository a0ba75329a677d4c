use std::sync::{Arc, Mutex, PoisonError};

use crate::core::AppConfig;
use crate::platform::{
    HeadlessClipboard, HeadlessPlatform, HeadlessPushService, UnconfiguredMessaging,
};
use crate::push::{
    MessageBinding, Permission, PushService, SubscriptionObserver, SurfaceKind, SurfaceSettings,
};
use crate::worker::WorkerSettings;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: AppConfig,
    pub platform: Arc<HeadlessPlatform>,
    pub clipboard: Arc<HeadlessClipboard>,
    pub web_push: SubscriptionObserver,
    pub messaging: SubscriptionObserver,
    pub worker: WorkerSettings,
    // Foreground listener for the messaging surface, bound to its current
    // token. Replacing it drops (and deregisters) the previous one.
    foreground: Mutex<Option<MessageBinding>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        platform: Arc<HeadlessPlatform>,
        clipboard: Arc<HeadlessClipboard>,
        web_push_service: Arc<dyn PushService>,
        messaging_service: Arc<dyn PushService>,
    ) -> Self {
        let web_push = SubscriptionObserver::new(
            SurfaceKind::WebPush,
            config.vapid_public_key.clone(),
            platform.clone(),
            web_push_service,
            SurfaceSettings {
                icon: config.icon.clone(),
                welcome_delay: config.welcome_delay,
            },
        );
        let messaging = SubscriptionObserver::new(
            SurfaceKind::Messaging,
            config.vapid_public_key.clone(),
            platform.clone(),
            messaging_service,
            SurfaceSettings {
                icon: config.icon.clone(),
                welcome_delay: None,
            },
        );
        let worker = WorkerSettings {
            app_name: config.app_name.clone(),
            icon: config.icon.clone(),
            ..Default::default()
        };

        Self {
            config,
            platform,
            clipboard,
            web_push,
            messaging,
            worker,
            foreground: Mutex::new(None),
        }
    }

    /// Everything on the headless platform. The messaging surface only gets
    /// a working SDK when backend credentials are configured.
    pub fn headless(config: AppConfig, answer: Permission, secure_clipboard: bool) -> Self {
        let messaging: Arc<dyn PushService> = match &config.firebase {
            Some(firebase) => {
                tracing::debug!("Messaging backend configured for {}", firebase.project_id);
                Arc::new(HeadlessPushService::messaging())
            }
            None => {
                tracing::warn!("No messaging backend credentials, FCM surface is disabled");
                Arc::new(UnconfiguredMessaging)
            }
        };
        Self::new(
            config,
            Arc::new(HeadlessPlatform::new(answer)),
            Arc::new(HeadlessClipboard::new(secure_clipboard)),
            Arc::new(HeadlessPushService::web_push()),
            messaging,
        )
    }

    /// Bind the foreground listener to the messaging surface's current
    /// token, replacing any earlier binding.
    pub fn bind_foreground(&self) {
        let binding = match self
            .messaging
            .on_message(self.messaging.foreground_handler())
        {
            Ok(binding) => Some(binding),
            Err(err) => {
                tracing::debug!("Not listening for foreground messages: {}", err);
                None
            }
        };
        *self.foreground.lock().unwrap_or_else(PoisonError::into_inner) = binding;
    }

    pub fn unbind_foreground(&self) {
        let binding = self
            .foreground
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(binding) = binding {
            binding.unregister();
        }
    }

    pub fn foreground_token(&self) -> Option<String> {
        self.foreground
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|b| b.token().to_string())
    }
}
