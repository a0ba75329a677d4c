use super::collaborator::Clipboard;
use super::error::PushError;

/// Copy `text` to the clipboard. Uses the secure clipboard API when it's
/// available, otherwise falls back to selecting and copying. Failures are
/// logged and reported as `false`.
pub async fn copy_to_clipboard(clipboard: &dyn Clipboard, text: &str) -> bool {
    let result = if clipboard.is_secure_context() {
        clipboard.write_text(text).await.map(|_| true)
    } else {
        tracing::debug!("Secure clipboard unavailable, falling back to selection copy");
        clipboard.copy_selection(text)
    };

    match result {
        Ok(copied) => copied,
        Err(err) => {
            let err = match err {
                PushError::ClipboardFailure(_) => err,
                other => PushError::ClipboardFailure(other.to_string()),
            };
            tracing::warn!("Failed to copy to clipboard: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct FakeClipboard {
        secure: bool,
        fail: bool,
        written: Mutex<Vec<String>>,
        selected: Mutex<Vec<String>>,
    }

    impl FakeClipboard {
        fn new(secure: bool, fail: bool) -> Self {
            Self {
                secure,
                fail,
                written: Mutex::new(Vec::new()),
                selected: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Clipboard for FakeClipboard {
        fn is_secure_context(&self) -> bool {
            self.secure
        }

        async fn write_text(&self, text: &str) -> Result<(), PushError> {
            if self.fail {
                return Err(PushError::ClipboardFailure("write denied".to_string()));
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn copy_selection(&self, text: &str) -> Result<bool, PushError> {
            if self.fail {
                return Err(PushError::collaborator("no document"));
            }
            self.selected.lock().unwrap().push(text.to_string());
            Ok(true)
        }
    }

    #[tokio::test]
    async fn it_uses_the_secure_api_when_available() {
        let clipboard = FakeClipboard::new(true, false);
        assert!(copy_to_clipboard(&clipboard, "token-1").await);
        assert_eq!(*clipboard.written.lock().unwrap(), vec!["token-1"]);
        assert!(clipboard.selected.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_falls_back_to_selection_copy() {
        let clipboard = FakeClipboard::new(false, false);
        assert!(copy_to_clipboard(&clipboard, "token-2").await);
        assert_eq!(*clipboard.selected.lock().unwrap(), vec!["token-2"]);
    }

    #[tokio::test]
    async fn it_reports_failure_as_false() {
        assert!(!copy_to_clipboard(&FakeClipboard::new(true, true), "x").await);
        assert!(!copy_to_clipboard(&FakeClipboard::new(false, true), "x").await);
    }

    #[tokio::test]
    async fn it_copies_an_empty_string() {
        let clipboard = FakeClipboard::new(true, false);
        assert!(copy_to_clipboard(&clipboard, "").await);
    }
}
