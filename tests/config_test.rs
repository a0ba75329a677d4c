//! Tests for reading the configuration from the environment

#[cfg(test)]
mod tests {
    use std::env;
    use std::time::Duration;

    use pushbell::core::AppConfig;
    use serial_test::serial;

    const VAPID_KEY: &str =
        "BJ8YKZk_DlJuAGSrq1Q4Q2U0vJ0KrjXZZ4B7BQfF5Jj4Z1QhLwUzKwOqXd6Y3aGbHwK1FgPjXzY9NhBvZVd-zKo";

    const VARS: [&str; 10] = [
        "PUSHBELL_VAPID_PUBLIC_KEY",
        "PUSHBELL_FIREBASE_API_KEY",
        "PUSHBELL_FIREBASE_AUTH_DOMAIN",
        "PUSHBELL_FIREBASE_PROJECT_ID",
        "PUSHBELL_FIREBASE_STORAGE_BUCKET",
        "PUSHBELL_FIREBASE_MESSAGING_SENDER_ID",
        "PUSHBELL_FIREBASE_APP_ID",
        "PUSHBELL_APP_NAME",
        "PUSHBELL_ICON",
        "PUSHBELL_WELCOME_DELAY_SECS",
    ];

    // Tests run serially so nothing else reads the environment mid-update
    fn reset_env(vars: &[(&str, &str)]) {
        unsafe {
            for name in VARS {
                env::remove_var(name);
            }
            for (name, value) in vars {
                env::set_var(name, value);
            }
        }
    }

    /// Tests the VAPID key is required
    #[test]
    #[serial]
    fn it_requires_the_vapid_key() {
        reset_env(&[]);
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("PUSHBELL_VAPID_PUBLIC_KEY"));
    }

    /// Tests a key that isn't base64 fails at startup
    #[test]
    #[serial]
    fn it_rejects_an_invalid_vapid_key() {
        reset_env(&[("PUSHBELL_VAPID_PUBLIC_KEY", "not*base64")]);
        assert!(AppConfig::from_env().is_err());
    }

    /// Tests the defaults when only the key is set
    #[test]
    #[serial]
    fn it_reads_the_minimal_config() {
        reset_env(&[("PUSHBELL_VAPID_PUBLIC_KEY", VAPID_KEY)]);
        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.vapid_public_key.as_str(), VAPID_KEY);
        assert!(config.firebase.is_none());
        assert_eq!(config.app_name, "pushbell");
        assert_eq!(config.welcome_delay, Some(Duration::from_secs(5)));
    }

    /// Tests firebase credentials are all or nothing
    #[test]
    #[serial]
    fn it_rejects_partial_firebase_credentials() {
        reset_env(&[
            ("PUSHBELL_VAPID_PUBLIC_KEY", VAPID_KEY),
            ("PUSHBELL_FIREBASE_API_KEY", "key"),
            ("PUSHBELL_FIREBASE_PROJECT_ID", "demo"),
        ]);
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("PUSHBELL_FIREBASE_AUTH_DOMAIN"));
    }

    /// Tests the full set of overrides
    #[test]
    #[serial]
    fn it_reads_every_override() {
        reset_env(&[
            ("PUSHBELL_VAPID_PUBLIC_KEY", VAPID_KEY),
            ("PUSHBELL_FIREBASE_API_KEY", "key"),
            ("PUSHBELL_FIREBASE_AUTH_DOMAIN", "demo.firebaseapp.com"),
            ("PUSHBELL_FIREBASE_PROJECT_ID", "demo"),
            ("PUSHBELL_FIREBASE_STORAGE_BUCKET", "demo.firebasestorage.app"),
            ("PUSHBELL_FIREBASE_MESSAGING_SENDER_ID", "42"),
            ("PUSHBELL_FIREBASE_APP_ID", "1:42:web:ff"),
            ("PUSHBELL_APP_NAME", "Alerts"),
            ("PUSHBELL_ICON", "/bell.png"),
            ("PUSHBELL_WELCOME_DELAY_SECS", "0"),
        ]);
        let config = AppConfig::from_env().unwrap();

        let firebase = config.firebase.unwrap();
        assert_eq!(firebase.project_id, "demo");
        assert_eq!(firebase.messaging_sender_id, "42");
        assert_eq!(config.app_name, "Alerts");
        assert_eq!(config.icon, "/bell.png");
        assert_eq!(config.welcome_delay, None);
    }

    /// Tests the welcome delay must be a number
    #[test]
    #[serial]
    fn it_rejects_a_non_numeric_welcome_delay() {
        reset_env(&[
            ("PUSHBELL_VAPID_PUBLIC_KEY", VAPID_KEY),
            ("PUSHBELL_WELCOME_DELAY_SECS", "soon"),
        ]);
        assert!(AppConfig::from_env().is_err());
    }
}
