use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use web_push::SubscriptionInfo;

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

/// What the platform can do. Checked up front, before any mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub service_worker: bool,
    pub push_manager: bool,
    pub notification: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            service_worker: true,
            push_manager: true,
            notification: true,
        }
    }
}

/// A live subscription handed out by a push service.
///
/// `token` is what addresses the device: the endpoint URL for Web Push,
/// the registration token for the messaging backend.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<SubscriptionInfo>,
}

impl Subscription {
    pub fn web_push(info: SubscriptionInfo) -> Self {
        Self {
            token: info.endpoint.clone(),
            info: Some(info),
        }
    }

    pub fn messaging(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            info: None,
        }
    }

    /// The JSON shown to the user in the subscription details panel.
    pub fn display_form(&self) -> serde_json::Value {
        match &self.info {
            Some(info) => serde_json::to_value(info)
                .unwrap_or_else(|_| serde_json::json!({ "endpoint": self.token })),
            None => serde_json::json!({ "token": self.token }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A message pushed by the messaging backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<MessageNotification>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
    #[serde(
        default,
        rename = "messageId",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,
}

impl InboundMessage {
    pub fn notification(title: &str, body: &str) -> Self {
        Self {
            notification: Some(MessageNotification {
                title: Some(title.to_string()),
                body: Some(body.to_string()),
                icon: None,
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

impl NotificationAction {
    pub fn new(action: &str, title: &str, icon: &str) -> Self {
        Self {
            action: action.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub data: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vibrate: Vec<u32>,
    // Notifications sharing a tag replace each other in the tray
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl NotificationOptions {
    pub fn with_body(body: &str, icon: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            icon: Some(icon.to_string()),
            badge: Some(icon.to_string()),
            ..Default::default()
        }
    }
}

/// Handle the platform assigns to each notification it shows.
pub type NotificationId = u64;

/// A notification as it sits in the tray.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShownNotification {
    pub id: NotificationId,
    pub title: String,
    #[serde(flatten)]
    pub options: NotificationOptions,
}
