//! Public types for the background worker API
use serde::Serialize;

use crate::push::NotificationId;
use crate::worker::Displayed;

#[derive(Serialize)]
pub struct ShownResponse {
    /// Tray id of the notification shown, if any
    pub id: Option<NotificationId>,
    pub title: Option<String>,
}

impl From<Option<Displayed>> for ShownResponse {
    fn from(displayed: Option<Displayed>) -> Self {
        match displayed {
            Some(Displayed { id, title }) => Self {
                id: Some(id),
                title: Some(title),
            },
            None => Self {
                id: None,
                title: None,
            },
        }
    }
}
