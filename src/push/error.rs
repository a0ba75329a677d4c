use thiserror::Error;

/// The VAPID key could not be decoded into raw bytes.
#[derive(Debug, Error)]
#[error("invalid application server key: {0}")]
pub struct DecodeError(#[from] pub base64::DecodeError);

/// Failures a surface operation can run into. None of these are fatal:
/// each one ends up as the message of the surface's `Error` state.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("permission not granted")]
    PermissionDenied,
    #[error("{0}")]
    UnsupportedPlatform(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("{0}")]
    CollaboratorFailure(String),
    #[error("clipboard copy failed: {0}")]
    ClipboardFailure(String),
    #[error("another operation is already in progress")]
    Busy,
    #[error("not subscribed")]
    NotSubscribed,
}

impl PushError {
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::CollaboratorFailure(msg.into())
    }
}
