//! An in-process stand-in for the browser and the messaging SDK.
//!
//! Permission prompts resolve with a fixed answer, push services hand out
//! locally generated subscriptions, and notifications land in an in-memory
//! tray. Nothing here talks to the network.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;
use web_push::SubscriptionInfo;

use crate::push::codec::{self, KeyBytes};
use crate::push::{
    Capabilities, Clipboard, InboundMessage, MessageHandler, NotificationId, NotificationOptions,
    NotificationPlatform, Permission, PushError, PushService, Registration, ShownNotification,
    Subscription, WindowClients,
};

// Uncompressed P-256 public key: 0x04 followed by the X and Y coordinates
const P256_PUBLIC_KEY_LEN: usize = 65;

pub struct HeadlessPlatform {
    capabilities: Capabilities,
    answer: Permission,
    permission: RwLock<Permission>,
    prompts: AtomicUsize,
    next_notification: AtomicU64,
    tray: RwLock<Vec<ShownNotification>>,
    opened: RwLock<Vec<String>>,
}

impl HeadlessPlatform {
    /// `answer` is what the user picks whenever they're prompted.
    pub fn new(answer: Permission) -> Self {
        Self {
            capabilities: Capabilities::all(),
            answer,
            permission: RwLock::new(Permission::Default),
            prompts: AtomicUsize::new(0),
            next_notification: AtomicU64::new(1),
            tray: RwLock::new(Vec::new()),
            opened: RwLock::new(Vec::new()),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Start out with permission already decided, as if from an earlier visit.
    pub fn with_permission(self, permission: Permission) -> Self {
        *self.permission.write().unwrap_or_else(PoisonError::into_inner) = permission;
        self
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn notifications(&self) -> Vec<ShownNotification> {
        self.tray
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn opened_windows(&self) -> Vec<String> {
        self.opened
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl NotificationPlatform for HeadlessPlatform {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn permission(&self) -> Permission {
        *self.permission.read().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_permission(&self) -> Result<Permission, PushError> {
        if !self.capabilities.notification {
            return Err(PushError::UnsupportedPlatform(
                "notifications are not supported".to_string(),
            ));
        }

        let mut permission = self.permission.write().unwrap_or_else(PoisonError::into_inner);
        // Once decided, the platform stops asking
        if *permission == Permission::Default {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            *permission = self.answer;
        }
        Ok(*permission)
    }

    fn show(&self, title: &str, options: NotificationOptions) -> Result<NotificationId, PushError> {
        if !self.capabilities.notification {
            return Err(PushError::UnsupportedPlatform(
                "notifications are not supported".to_string(),
            ));
        }

        let mut tray = self.tray.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(tag) = &options.tag {
            tray.retain(|n| n.options.tag.as_ref() != Some(tag));
        }
        let id = self.next_notification.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Showing notification {} {:?}", id, title);
        tray.push(ShownNotification {
            id,
            title: title.to_string(),
            options,
        });
        Ok(id)
    }

    fn close(&self, id: NotificationId) -> Result<(), PushError> {
        let mut tray = self.tray.write().unwrap_or_else(PoisonError::into_inner);
        let before = tray.len();
        tray.retain(|n| n.id != id);
        if tray.len() == before {
            tracing::debug!("Notification {} already closed", id);
        }
        Ok(())
    }
}

#[async_trait]
impl WindowClients for HeadlessPlatform {
    async fn open_window(&self, url: &str) -> Result<(), PushError> {
        tracing::debug!("Opening window at {}", url);
        self.opened
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    WebPush,
    Messaging,
}

struct Listener {
    token: String,
    handler: MessageHandler,
}

type Listeners = Arc<RwLock<HashMap<u64, Listener>>>;

/// Push manager (`web_push`) or messaging SDK (`messaging`).
pub struct HeadlessPushService {
    flavor: Flavor,
    current: RwLock<Option<Subscription>>,
    listeners: Listeners,
    next_listener: AtomicU64,
    subscribe_calls: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl HeadlessPushService {
    pub fn web_push() -> Self {
        Self::new(Flavor::WebPush)
    }

    pub fn messaging() -> Self {
        Self::new(Flavor::Messaging)
    }

    fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            current: RwLock::new(None),
            listeners: Arc::new(RwLock::new(HashMap::new())),
            next_listener: AtomicU64::new(1),
            subscribe_calls: AtomicUsize::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Make the next call into the service fail with `message`.
    pub fn fail_next(&self, message: &str) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Option<Subscription> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Hand `message` to every listener bound to `token`. Returns how many
    /// listeners it reached.
    pub fn deliver(&self, token: &str, message: InboundMessage) -> usize {
        let handlers: Vec<MessageHandler> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|l| l.token == token)
            .map(|l| Arc::clone(&l.handler))
            .collect();

        for handler in &handlers {
            handler(message.clone());
        }
        handlers.len()
    }

    /// Replace the current token, as the backend does when it expires one.
    pub fn rotate_token(&self) -> Option<String> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        current.as_ref()?;
        let rotated = self.issue();
        let token = rotated.token.clone();
        *current = Some(rotated);
        Some(token)
    }

    fn take_failure(&self) -> Result<(), PushError> {
        match self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            Some(msg) => Err(PushError::CollaboratorFailure(msg)),
            None => Ok(()),
        }
    }

    fn issue(&self) -> Subscription {
        match self.flavor {
            Flavor::WebPush => {
                let mut p256dh = vec![0x04];
                while p256dh.len() < P256_PUBLIC_KEY_LEN {
                    p256dh.extend_from_slice(Uuid::new_v4().as_bytes());
                }
                p256dh.truncate(P256_PUBLIC_KEY_LEN);
                let auth = Uuid::new_v4();
                Subscription::web_push(SubscriptionInfo::new(
                    format!("https://push.headless.invalid/wp/{}", Uuid::new_v4().simple()),
                    codec::encode(&p256dh).to_string(),
                    codec::encode(auth.as_bytes()).to_string(),
                ))
            }
            Flavor::Messaging => {
                let instance = codec::encode(&Uuid::new_v4().as_bytes()[..8]);
                Subscription::messaging(format!(
                    "{}:APA91b{}",
                    instance,
                    Uuid::new_v4().simple()
                ))
            }
        }
    }
}

#[async_trait]
impl PushService for HeadlessPushService {
    async fn existing(&self) -> Result<Option<Subscription>, PushError> {
        self.take_failure()?;
        Ok(self.current())
    }

    async fn subscribe(&self, key: &KeyBytes) -> Result<Option<Subscription>, PushError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let bytes = key.as_bytes();
        if bytes.len() != P256_PUBLIC_KEY_LEN || bytes[0] != 0x04 {
            return Err(PushError::collaborator(
                "applicationServerKey is not a valid P-256 public key",
            ));
        }

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let subscription = current.get_or_insert_with(|| self.issue()).clone();
        Ok(Some(subscription))
    }

    async fn cancel(&self, subscription: &Subscription) -> Result<(), PushError> {
        self.take_failure()?;

        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let active = current
                .as_ref()
                .is_some_and(|active| active.token == subscription.token);
            if !active {
                return Err(PushError::collaborator("subscription is not active"));
            }
            *current = None;
        }

        // A deleted token never receives anything again
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, l| l.token != subscription.token);
        Ok(())
    }

    fn on_message(&self, token: &str, handler: MessageHandler) -> Result<Registration, PushError> {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Listener {
                    token: token.to_string(),
                    handler,
                },
            );

        let listeners = Arc::downgrade(&self.listeners);
        Ok(Registration::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&id);
            }
        }))
    }
}

/// Clipboard that keeps whatever was last copied.
pub struct HeadlessClipboard {
    secure: bool,
    contents: RwLock<Option<String>>,
}

impl HeadlessClipboard {
    pub fn new(secure: bool) -> Self {
        Self {
            secure,
            contents: RwLock::new(None),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Clipboard for HeadlessClipboard {
    fn is_secure_context(&self) -> bool {
        self.secure
    }

    async fn write_text(&self, text: &str) -> Result<(), PushError> {
        if !self.secure {
            return Err(PushError::ClipboardFailure(
                "clipboard API requires a secure context".to_string(),
            ));
        }
        *self.contents.write().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }

    fn copy_selection(&self, text: &str) -> Result<bool, PushError> {
        *self.contents.write().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vapid_key() -> KeyBytes {
        let mut key = vec![0x04];
        key.extend(std::iter::repeat_n(7u8, 64));
        KeyBytes::from(key)
    }

    #[tokio::test]
    async fn it_prompts_once() {
        let platform = HeadlessPlatform::new(Permission::Granted);
        assert_eq!(platform.permission(), Permission::Default);
        assert_eq!(platform.request_permission().await.unwrap(), Permission::Granted);
        assert_eq!(platform.request_permission().await.unwrap(), Permission::Granted);
        assert_eq!(platform.prompts(), 1);
    }

    #[tokio::test]
    async fn it_keeps_an_earlier_decision() {
        let platform = HeadlessPlatform::new(Permission::Granted).with_permission(Permission::Denied);
        assert_eq!(platform.request_permission().await.unwrap(), Permission::Denied);
        assert_eq!(platform.prompts(), 0);
    }

    #[test]
    fn it_replaces_notifications_with_the_same_tag() {
        let platform = HeadlessPlatform::new(Permission::Granted);
        let tagged = |body: &str| NotificationOptions {
            body: Some(body.to_string()),
            tag: Some("status".to_string()),
            ..Default::default()
        };
        platform.show("a", tagged("first")).unwrap();
        platform.show("b", tagged("second")).unwrap();
        platform.show("c", NotificationOptions::default()).unwrap();

        let titles: Vec<String> = platform.notifications().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[test]
    fn it_closes_only_the_given_notification() {
        let platform = HeadlessPlatform::new(Permission::Granted);
        let first = platform.show("first", NotificationOptions::default()).unwrap();
        let second = platform.show("second", NotificationOptions::default()).unwrap();
        assert_ne!(first, second);

        platform.close(first).unwrap();
        let titles: Vec<String> = platform.notifications().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["second"]);

        // Already gone
        platform.close(first).unwrap();
        assert_eq!(platform.notifications().len(), 1);
    }

    #[tokio::test]
    async fn it_issues_web_push_subscriptions() {
        let service = HeadlessPushService::web_push();
        let sub = service.subscribe(&vapid_key()).await.unwrap().unwrap();
        let info = sub.info.clone().unwrap();

        assert_eq!(sub.token, info.endpoint);
        assert_eq!(codec::decode(&info.keys.p256dh).unwrap().len(), 65);
        assert_eq!(codec::decode(&info.keys.auth).unwrap().len(), 16);
        assert_eq!(sub.display_form()["keys"]["auth"], info.keys.auth);

        // Subscribing again hands back the same subscription
        let again = service.subscribe(&vapid_key()).await.unwrap().unwrap();
        assert_eq!(again.token, sub.token);
    }

    #[tokio::test]
    async fn it_rejects_keys_that_are_not_p256_points() {
        let service = HeadlessPushService::messaging();
        let result = service.subscribe(&KeyBytes::from(vec![1, 2, 3])).await;
        assert!(matches!(result, Err(PushError::CollaboratorFailure(_))));
    }

    #[tokio::test]
    async fn it_forgets_listeners_of_a_deleted_token() {
        let service = HeadlessPushService::messaging();
        let sub = service.subscribe(&vapid_key()).await.unwrap().unwrap();
        let _registration = service
            .on_message(&sub.token, Arc::new(|_: InboundMessage| {}))
            .unwrap();
        assert_eq!(service.deliver(&sub.token, InboundMessage::default()), 1);

        service.cancel(&sub).await.unwrap();
        assert_eq!(service.deliver(&sub.token, InboundMessage::default()), 0);
        assert!(service.cancel(&sub).await.is_err());
    }

    #[tokio::test]
    async fn it_falls_back_to_selection_without_a_secure_context() {
        let clipboard = HeadlessClipboard::new(false);
        assert!(clipboard.write_text("abc").await.is_err());
        assert!(crate::push::copy_to_clipboard(&clipboard, "abc").await);
        assert_eq!(clipboard.contents().as_deref(), Some("abc"));
    }
}
