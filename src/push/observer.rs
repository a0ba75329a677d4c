//! Per-surface subscription state and the operations that drive it.
//!
//! A surface (the Web Push panel or the messaging panel) owns exactly one
//! `SurfaceState` record. Only the operations on `SubscriptionObserver`
//! change it, and at most one of the mutating ones runs at a time: a second
//! call while one is in flight is refused with `PushError::Busy`, the same
//! way the UI disables its buttons while `is_loading` is set.
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::Serialize;

use super::clipboard::copy_to_clipboard;
use super::codec::EncodedKey;
use super::collaborator::{
    Clipboard, MessageHandler, NotificationPlatform, PushService, Registration,
};
use super::error::PushError;
use super::models::{
    Capabilities, InboundMessage, NotificationOptions, Permission, Subscription,
};

/// Which opt-in path a surface drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    WebPush,
    Messaging,
}

impl SurfaceKind {
    /// The message to show instead of the controls, if the platform lacks
    /// something this path needs.
    fn unsupported_message(&self, caps: &Capabilities) -> Option<String> {
        match self {
            SurfaceKind::WebPush => (!caps.service_worker || !caps.push_manager)
                .then(|| "This browser does not support push notifications".to_string()),
            SurfaceKind::Messaging => {
                if caps.service_worker && caps.notification {
                    return None;
                }
                let mut msg = String::from("This browser does not support FCM");
                if !caps.service_worker {
                    msg.push_str(" (Service Worker unsupported)");
                }
                if !caps.notification {
                    msg.push_str(" (Notification unsupported)");
                }
                Some(msg)
            }
        }
    }

    fn missing_subscription_message(&self) -> &'static str {
        match self {
            SurfaceKind::WebPush => "Push service returned no subscription",
            SurfaceKind::Messaging => "Failed to obtain FCM token",
        }
    }

    fn test_notification(&self) -> (&'static str, &'static str) {
        match self {
            SurfaceKind::WebPush => ("Test notification", "Push subscription complete!"),
            SurfaceKind::Messaging => ("FCM test notification", "This is an FCM test notification"),
        }
    }
}

/// What the UI shows as the subscription status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribed(String),
    Error(String),
}

/// The record a surface owns.
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceState {
    pub supported: bool,
    pub subscription: Option<Subscription>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub last_message: Option<InboundMessage>,
}

impl SurfaceState {
    fn new(supported: bool) -> Self {
        Self {
            supported,
            subscription: None,
            is_loading: false,
            error: None,
            last_message: None,
        }
    }

    /// The last error wins over the subscription: it's cleared again by the
    /// next operation the user starts.
    pub fn state(&self) -> SubscriptionState {
        if let Some(err) = &self.error {
            return SubscriptionState::Error(err.clone());
        }
        match &self.subscription {
            Some(sub) => SubscriptionState::Subscribed(sub.token.clone()),
            None => SubscriptionState::Unsubscribed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SurfaceSettings {
    pub icon: String,
    /// Web Push only: show a test notification this long after subscribing.
    pub welcome_delay: Option<Duration>,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            icon: "/favicon.svg".to_string(),
            welcome_delay: None,
        }
    }
}

/// A message listener bound to one token.
#[derive(Debug)]
pub struct MessageBinding {
    token: String,
    registration: Registration,
}

impl MessageBinding {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn unregister(self) {
        self.registration.unregister();
    }
}

// Clears `is_loading` when the operation finishes, however it finishes.
struct LoadingGuard {
    record: Arc<RwLock<SurfaceState>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.record
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .is_loading = false;
    }
}

pub struct SubscriptionObserver {
    kind: SurfaceKind,
    key: EncodedKey,
    platform: Arc<dyn NotificationPlatform>,
    service: Arc<dyn PushService>,
    settings: SurfaceSettings,
    record: Arc<RwLock<SurfaceState>>,
}

impl SubscriptionObserver {
    pub fn new(
        kind: SurfaceKind,
        key: EncodedKey,
        platform: Arc<dyn NotificationPlatform>,
        service: Arc<dyn PushService>,
        settings: SurfaceSettings,
    ) -> Self {
        let supported = kind.unsupported_message(&platform.capabilities()).is_none();
        Self {
            kind,
            key,
            platform,
            service,
            settings,
            record: Arc::new(RwLock::new(SurfaceState::new(supported))),
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn state(&self) -> SubscriptionState {
        self.read().state()
    }

    pub fn snapshot(&self) -> SurfaceState {
        self.read().clone()
    }

    pub fn subscription(&self) -> Option<Subscription> {
        self.read().subscription.clone()
    }

    /// Look for an existing subscription without prompting. Failures are
    /// only logged: the record keeps whatever it had, so a page load never
    /// starts out in the error state and a live token stays bound.
    pub async fn check_status(&self) -> SubscriptionState {
        if !self.read().supported {
            return SubscriptionState::Unsubscribed;
        }
        let Ok(_loading) = self.begin(false) else {
            return self.state();
        };

        match self.service.existing().await {
            Ok(existing) => {
                let mut record = self.write();
                record.subscription = existing;
                record.state()
            }
            Err(err) => {
                tracing::warn!("Failed to check {:?} subscription status: {}", self.kind, err);
                self.state()
            }
        }
    }

    /// Ask for permission, then subscribe with the configured application
    /// server key. Refused with `Busy` if another operation is running;
    /// every other failure ends up in the returned state.
    pub async fn subscribe(&self) -> Result<SubscriptionState, PushError> {
        let _loading = self.begin(true)?;
        if let Some(msg) = self.unsupported() {
            return Ok(self.fail(PushError::UnsupportedPlatform(msg)));
        }
        if let Some(sub) = self.subscription() {
            return Ok(SubscriptionState::Subscribed(sub.token));
        }

        match self.request_subscription().await {
            Ok(subscription) => {
                tracing::info!(
                    "Subscribed {:?}: {}",
                    self.kind,
                    subscription.display_form()
                );
                self.write().subscription = Some(subscription);
                self.schedule_welcome();
                Ok(self.state())
            }
            Err(err) => {
                tracing::error!("Failed to subscribe {:?}: {}", self.kind, err);
                Ok(self.fail(err))
            }
        }
    }

    async fn request_subscription(&self) -> Result<Subscription, PushError> {
        let permission = match self.platform.permission() {
            Permission::Granted => Permission::Granted,
            _ => self.platform.request_permission().await?,
        };
        if permission != Permission::Granted {
            return Err(PushError::PermissionDenied);
        }

        let key = self.key.decode()?;
        self.service
            .subscribe(&key)
            .await?
            .ok_or_else(|| PushError::collaborator(self.kind.missing_subscription_message()))
    }

    /// Cancel the current subscription. A no-op when there isn't one.
    pub async fn unsubscribe(&self) -> Result<SubscriptionState, PushError> {
        let _loading = self.begin(true)?;
        if let Some(msg) = self.unsupported() {
            return Ok(self.fail(PushError::UnsupportedPlatform(msg)));
        }
        let Some(subscription) = self.subscription() else {
            return Ok(SubscriptionState::Unsubscribed);
        };

        if let Err(err) = self.service.cancel(&subscription).await {
            tracing::error!("Failed to unsubscribe {:?}: {}", self.kind, err);
            return Ok(self.fail(err));
        }

        {
            let mut record = self.write();
            record.subscription = None;
            record.last_message = None;
        }
        tracing::info!("Unsubscribed {:?}", self.kind);

        if self.kind == SurfaceKind::Messaging {
            self.show_local(
                "Unsubscribed",
                NotificationOptions::with_body(
                    "Unsubscribed from FCM push notifications",
                    &self.settings.icon,
                ),
            );
        }
        Ok(self.state())
    }

    /// Bind `handler` to the current token. It only sees messages while that
    /// token is the active one, so after an unsubscribe or a token change it
    /// goes quiet and the caller has to bind again.
    pub fn on_message(&self, handler: MessageHandler) -> Result<MessageBinding, PushError> {
        let token = self
            .subscription()
            .ok_or(PushError::NotSubscribed)?
            .token;

        let record = Arc::clone(&self.record);
        let bound = token.clone();
        let wrapped: MessageHandler = Arc::new(move |message: InboundMessage| {
            {
                let mut record = record.write().unwrap_or_else(PoisonError::into_inner);
                let active = record
                    .subscription
                    .as_ref()
                    .is_some_and(|sub| sub.token == bound);
                if !active {
                    tracing::debug!("Dropping message for inactive token");
                    return;
                }
                record.last_message = Some(message.clone());
            }
            handler(message);
        });

        let registration = self.service.on_message(&token, wrapped)?;
        Ok(MessageBinding {
            token,
            registration,
        })
    }

    /// Handler that mirrors foreground messages into the notification tray.
    pub fn foreground_handler(&self) -> MessageHandler {
        let platform = Arc::clone(&self.platform);
        let icon = self.settings.icon.clone();
        Arc::new(move |message: InboundMessage| {
            let Some(notification) = &message.notification else {
                return;
            };
            if platform.permission() != Permission::Granted {
                return;
            }
            let title = notification
                .title
                .clone()
                .unwrap_or_else(|| "FCM notification".to_string());
            let options = NotificationOptions {
                body: notification.body.clone(),
                icon: Some(notification.icon.clone().unwrap_or_else(|| icon.clone())),
                data: message
                    .data
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
                ..Default::default()
            };
            if let Err(err) = platform.show(&title, options) {
                tracing::warn!("Failed to show foreground notification: {}", err);
            }
        })
    }

    /// Re-query the push service for the current token. Returns the new
    /// token if it changed; bindings to the old one stop receiving.
    pub async fn refresh_token(&self) -> Result<Option<String>, PushError> {
        let _loading = self.begin(false)?;
        let Some(current) = self.subscription() else {
            return Ok(None);
        };

        match self.service.existing().await? {
            Some(refreshed) if refreshed.token != current.token => {
                let token = refreshed.token.clone();
                self.write().subscription = Some(refreshed);
                tracing::info!("{:?} token refreshed", self.kind);
                Ok(Some(token))
            }
            Some(_) => Ok(None),
            None => {
                tracing::warn!("{:?} push service no longer reports a subscription", self.kind);
                Ok(None)
            }
        }
    }

    /// Show a local test notification. Returns whether it was shown.
    pub fn send_test_notification(&self) -> bool {
        let (title, body) = self.kind.test_notification();
        self.show_local(title, NotificationOptions::with_body(body, &self.settings.icon))
    }

    /// Copy the current token to the clipboard.
    pub async fn copy_token(&self, clipboard: &dyn Clipboard) -> bool {
        let Some(subscription) = self.subscription() else {
            return false;
        };
        let copied = copy_to_clipboard(clipboard, &subscription.token).await;
        if copied {
            self.show_local(
                "Token copied",
                NotificationOptions::with_body(
                    "The FCM token was copied to the clipboard",
                    &self.settings.icon,
                ),
            );
        }
        copied
    }

    fn show_local(&self, title: &str, options: NotificationOptions) -> bool {
        show_if_permitted(self.platform.as_ref(), title, options)
    }

    fn schedule_welcome(&self) {
        if self.kind != SurfaceKind::WebPush {
            return;
        }
        let Some(delay) = self.settings.welcome_delay else {
            return;
        };
        let platform = Arc::clone(&self.platform);
        let (title, body) = self.kind.test_notification();
        let options = NotificationOptions::with_body(body, &self.settings.icon);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            show_if_permitted(platform.as_ref(), title, options);
        });
    }

    fn unsupported(&self) -> Option<String> {
        self.kind
            .unsupported_message(&self.platform.capabilities())
    }

    fn begin(&self, clear_error: bool) -> Result<LoadingGuard, PushError> {
        let mut record = self.write();
        if record.is_loading {
            return Err(PushError::Busy);
        }
        record.is_loading = true;
        if clear_error {
            record.error = None;
        }
        Ok(LoadingGuard {
            record: Arc::clone(&self.record),
        })
    }

    fn fail(&self, err: PushError) -> SubscriptionState {
        let mut record = self.write();
        record.error = Some(err.to_string());
        record.state()
    }

    fn read(&self) -> RwLockReadGuard<'_, SurfaceState> {
        self.record.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SurfaceState> {
        self.record.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn show_if_permitted(
    platform: &dyn NotificationPlatform,
    title: &str,
    options: NotificationOptions,
) -> bool {
    if platform.permission() != Permission::Granted {
        tracing::debug!("Skipping notification {:?}, permission not granted", title);
        return false;
    }
    match platform.show(title, options) {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!("Failed to show notification {:?}: {}", title, err);
            false
        }
    }
}
