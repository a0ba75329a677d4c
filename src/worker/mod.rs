//! Background delivery entrypoint.
//!
//! Runs while the UI isn't open, so nothing here can see a surface's state.
//! Each handler works from the inbound event and the platform alone.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::push::{
    InboundMessage, NotificationAction, NotificationId, NotificationOptions, NotificationPlatform,
    PushError, WindowClients,
};

const DEFAULT_PUSH_BODY: &str = "Default push notification message";
const DEFAULT_BACKGROUND_TITLE: &str = "FCM Background Message";
const DEFAULT_BACKGROUND_BODY: &str = "FCM Background Message body.";
const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];

/// Static bits of the background notifications.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub app_name: String,
    pub icon: String,
    /// Window to focus or open when a notification is clicked.
    pub start_url: String,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            app_name: "pushbell".to_string(),
            icon: "/favicon.svg".to_string(),
            start_url: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "url", rename_all = "snake_case")]
pub enum ClickOutcome {
    OpenedWindow(String),
    Dismissed,
}

/// A notification the worker put in the tray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Displayed {
    pub id: NotificationId,
    pub title: String,
}

/// The notification a click landed on, and which of its actions, if any.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationClick {
    #[serde(default)]
    pub notification: Option<NotificationId>,
    #[serde(default)]
    pub action: Option<String>,
}

// JSON payloads only contribute their `body` field; anything that isn't JSON
// is the body itself.
fn push_body(data: &[u8]) -> Option<String> {
    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(payload)) => match payload.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(body)) => Some(body.clone()),
            Some(other) => Some(other.to_string()),
        },
        Ok(_) => None,
        Err(_) => Some(String::from_utf8_lossy(data).into_owned()),
    }
}

/// Handle a raw push event. The payload is read as JSON with a `body`
/// field, or as plain text when it isn't JSON. Returns what was shown, or
/// `None` when the event had no data.
pub fn handle_push(
    platform: &dyn NotificationPlatform,
    settings: &WorkerSettings,
    data: Option<&[u8]>,
) -> Result<Option<Displayed>, PushError> {
    let Some(data) = data else {
        tracing::debug!("Push event without data, nothing to show");
        return Ok(None);
    };

    let body = push_body(data)
        .filter(|body| !body.is_empty())
        .unwrap_or_else(|| DEFAULT_PUSH_BODY.to_string());

    let options = NotificationOptions {
        body: Some(body),
        icon: Some(settings.icon.clone()),
        badge: Some(settings.icon.clone()),
        data: arrival_data(),
        actions: vec![
            NotificationAction::new("explore", "View details", &settings.icon),
            NotificationAction::new("close", "Close", &settings.icon),
        ],
        vibrate: VIBRATE_PATTERN.to_vec(),
        tag: None,
    };

    tracing::info!("Received push event");
    let id = platform.show(&settings.app_name, options)?;
    Ok(Some(Displayed {
        id,
        title: settings.app_name.clone(),
    }))
}

/// Handle a message the messaging backend delivered while in the
/// background.
pub fn handle_background_message(
    platform: &dyn NotificationPlatform,
    settings: &WorkerSettings,
    message: &InboundMessage,
) -> Result<Displayed, PushError> {
    tracing::info!("Received background message {:?}", message.message_id);

    let notification = message.notification.clone().unwrap_or_default();
    let title = notification
        .title
        .unwrap_or_else(|| DEFAULT_BACKGROUND_TITLE.to_string());

    let mut data: Map<String, Value> = message
        .data
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    data.insert(
        "fcm_message_id".to_string(),
        message
            .message_id
            .clone()
            .map_or(Value::Null, Value::String),
    );
    data.extend(arrival_data());

    let options = NotificationOptions {
        body: Some(
            notification
                .body
                .unwrap_or_else(|| DEFAULT_BACKGROUND_BODY.to_string()),
        ),
        icon: Some(notification.icon.unwrap_or_else(|| settings.icon.clone())),
        badge: Some(settings.icon.clone()),
        data,
        actions: vec![
            NotificationAction::new("open", "Open", &settings.icon),
            NotificationAction::new("close", "Close", &settings.icon),
        ],
        vibrate: VIBRATE_PATTERN.to_vec(),
        tag: None,
    };

    let id = platform.show(&title, options)?;
    Ok(Displayed { id, title })
}

/// Handle a click on a background notification. The clicked notification
/// is closed whatever the action. `close` stops there; any other action,
/// or a click on the notification body, opens the app.
pub async fn handle_notification_click(
    platform: &dyn NotificationPlatform,
    clients: &dyn WindowClients,
    settings: &WorkerSettings,
    click: &NotificationClick,
) -> Result<ClickOutcome, PushError> {
    tracing::debug!(
        "Notification click received on {:?}, action {:?}",
        click.notification,
        click.action
    );

    if let Some(id) = click.notification {
        if let Err(err) = platform.close(id) {
            tracing::warn!("Failed to close notification {}: {}", id, err);
        }
    }

    match click.action.as_deref() {
        Some("close") => {
            tracing::debug!("Notification closed by user action");
            Ok(ClickOutcome::Dismissed)
        }
        _ => {
            clients.open_window(&settings.start_url).await?;
            Ok(ClickOutcome::OpenedWindow(settings.start_url.clone()))
        }
    }
}

fn arrival_data() -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(
        "dateOfArrival".to_string(),
        Value::from(Utc::now().timestamp_millis()),
    );
    data.insert("primaryKey".to_string(), Value::from(1));
    data
}
