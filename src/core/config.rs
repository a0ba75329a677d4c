use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::push::EncodedKey;
use crate::push::codec;

/// Messaging backend credentials. The SDK needs all of them to hand out
/// tokens, so they're only optional as a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl FirebaseConfig {
    fn from_env() -> Result<Option<Self>> {
        let Ok(api_key) = env::var("PUSHBELL_FIREBASE_API_KEY") else {
            return Ok(None);
        };
        let required = |name: &str| {
            env::var(name).with_context(|| format!("Missing env var {}", name))
        };

        Ok(Some(Self {
            api_key,
            auth_domain: required("PUSHBELL_FIREBASE_AUTH_DOMAIN")?,
            project_id: required("PUSHBELL_FIREBASE_PROJECT_ID")?,
            storage_bucket: required("PUSHBELL_FIREBASE_STORAGE_BUCKET")?,
            messaging_sender_id: required("PUSHBELL_FIREBASE_MESSAGING_SENDER_ID")?,
            app_id: required("PUSHBELL_FIREBASE_APP_ID")?,
        }))
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub vapid_public_key: EncodedKey,
    pub firebase: Option<FirebaseConfig>,
    pub app_name: String,
    pub icon: String,
    pub welcome_delay: Option<Duration>,
    pub token_refresh_interval: Duration,
}

impl AppConfig {
    pub fn new(vapid_public_key: &str) -> Self {
        Self {
            vapid_public_key: EncodedKey::new(vapid_public_key),
            firebase: None,
            app_name: "pushbell".to_string(),
            icon: "/favicon.svg".to_string(),
            welcome_delay: Some(Duration::from_secs(5)),
            token_refresh_interval: Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Read the configuration from the environment. The VAPID key is
    /// checked here so a bad key fails at startup rather than on the first
    /// subscribe.
    pub fn from_env() -> Result<Self> {
        let vapid_public_key = env::var("PUSHBELL_VAPID_PUBLIC_KEY")
            .context("Missing env var PUSHBELL_VAPID_PUBLIC_KEY")?;
        codec::decode(&vapid_public_key)
            .context("PUSHBELL_VAPID_PUBLIC_KEY is not URL-safe base64")?;

        let mut config = Self::new(&vapid_public_key);
        config.firebase = FirebaseConfig::from_env()?;
        if let Ok(app_name) = env::var("PUSHBELL_APP_NAME") {
            config.app_name = app_name;
        }
        if let Ok(icon) = env::var("PUSHBELL_ICON") {
            config.icon = icon;
        }
        if let Ok(secs) = env::var("PUSHBELL_WELCOME_DELAY_SECS") {
            let secs: u64 = secs
                .parse()
                .context("PUSHBELL_WELCOME_DELAY_SECS must be a number of seconds")?;
            // 0 turns the welcome notification off
            config.welcome_delay = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_defaults_everything_but_the_key() {
        let config = AppConfig::new("SGVsbG8");
        assert_eq!(config.vapid_public_key.as_str(), "SGVsbG8");
        assert_eq!(config.app_name, "pushbell");
        assert_eq!(config.welcome_delay, Some(Duration::from_secs(5)));
        assert_eq!(config.token_refresh_interval, Duration::from_secs(86_400));
        assert!(config.firebase.is_none());
    }
}
