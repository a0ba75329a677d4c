pub mod headless;
pub use headless::{HeadlessClipboard, HeadlessPlatform, HeadlessPushService};

use async_trait::async_trait;

use crate::push::{KeyBytes, PushError, PushService, Subscription};

/// Stands in for the messaging SDK when no backend credentials were
/// configured. Lookups find nothing and every mutating call fails.
pub struct UnconfiguredMessaging;

const NOT_INITIALIZED: &str = "Firebase Messaging is not initialized";

#[async_trait]
impl PushService for UnconfiguredMessaging {
    async fn existing(&self) -> Result<Option<Subscription>, PushError> {
        Ok(None)
    }

    async fn subscribe(&self, _key: &KeyBytes) -> Result<Option<Subscription>, PushError> {
        Err(PushError::collaborator(NOT_INITIALIZED))
    }

    async fn cancel(&self, _subscription: &Subscription) -> Result<(), PushError> {
        Err(PushError::collaborator(NOT_INITIALIZED))
    }
}
