//! The platform pieces a surface talks to. Everything behind these traits
//! belongs to the browser or the messaging SDK, not to us.
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::codec::KeyBytes;
use super::error::PushError;
use super::models::{
    Capabilities, InboundMessage, NotificationId, NotificationOptions, Permission, Subscription,
};

/// Callback for foreground messages. Runs on whatever task delivers the
/// message so it must not block.
pub type MessageHandler = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// Permission prompt and local notification display.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Current permission, without prompting.
    fn permission(&self) -> Permission;

    /// Prompt the user. Resolves with whatever they answered.
    async fn request_permission(&self) -> Result<Permission, PushError>;

    fn show(&self, title: &str, options: NotificationOptions) -> Result<NotificationId, PushError>;

    /// Remove a shown notification. Closing one that's already gone is not
    /// an error.
    fn close(&self, id: NotificationId) -> Result<(), PushError>;
}

/// A push service: the browser's push manager or the messaging SDK.
#[async_trait]
pub trait PushService: Send + Sync {
    /// Look up an existing subscription. Must never prompt.
    async fn existing(&self) -> Result<Option<Subscription>, PushError>;

    /// Create (or fetch) a subscription for the given application server
    /// key. `None` means the service answered without a token.
    async fn subscribe(&self, key: &KeyBytes) -> Result<Option<Subscription>, PushError>;

    /// Cancel the subscription / delete the token remotely.
    async fn cancel(&self, subscription: &Subscription) -> Result<(), PushError>;

    /// Listen for foreground messages addressed to `token`.
    fn on_message(&self, _token: &str, _handler: MessageHandler) -> Result<Registration, PushError> {
        Err(PushError::UnsupportedPlatform(
            "foreground messages are not available on this push service".to_string(),
        ))
    }
}

/// Secure clipboard API plus the manual selection fallback.
#[async_trait]
pub trait Clipboard: Send + Sync {
    fn is_secure_context(&self) -> bool;

    async fn write_text(&self, text: &str) -> Result<(), PushError>;

    /// Select-and-copy fallback. Returns whether the platform reported
    /// the copy as done.
    fn copy_selection(&self, text: &str) -> Result<bool, PushError>;
}

/// Window management available to the background entrypoint.
#[async_trait]
pub trait WindowClients: Send + Sync {
    async fn open_window(&self, url: &str) -> Result<(), PushError>;
}

/// Deregistration handle for a message listener. Dropping it
/// deregisters too.
pub struct Registration {
    unregister: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Registration {
    pub fn new(unregister: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unregister: Some(Box::new(unregister)),
        }
    }

    pub fn unregister(mut self) {
        if let Some(f) = self.unregister.take() {
            f();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(f) = self.unregister.take() {
            f();
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.unregister.is_some())
            .finish()
    }
}
