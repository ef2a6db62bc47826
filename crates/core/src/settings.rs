//! Typed access to the dynamic key/value settings store.
//!
//! The storage itself lives behind [`SettingsProvider`]; the core only
//! ever sees string/int lookups with defaults, so callers (and tests)
//! can back it with the database, an in-memory map, or anything else.

use subtle::ConstantTimeEq;

/// Setting key: portal session duration in hours.
pub const KEY_SESSION_DURATION_HOURS: &str = "session_duration_hours";
/// Setting key: shared secret for telemetry ingestion pushes.
pub const KEY_INGESTION_KEY: &str = "ingestion_key";
/// Setting key: webhook URL for access-point offline alerts.
pub const KEY_ALERT_WEBHOOK_URL: &str = "alert_webhook_url";

/// Default session duration when the setting is absent or malformed.
pub const DEFAULT_SESSION_DURATION_HOURS: i64 = 48;
/// Allowed session duration range in hours (1 hour to 30 days).
pub const SESSION_DURATION_RANGE: std::ops::RangeInclusive<i64> = 1..=720;

/// Read-only view over the dynamic settings store.
#[async_trait::async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Fetch a string setting, falling back to `default` when unset.
    async fn get_string(&self, key: &str, default: &str) -> String;

    /// Fetch an integer setting, falling back to `default` when unset
    /// or unparsable.
    async fn get_int(&self, key: &str, default: i64) -> i64;
}

/// Session duration policy, clamped to [1, 720] hours.
pub async fn session_duration_hours(settings: &dyn SettingsProvider) -> i64 {
    settings
        .get_int(KEY_SESSION_DURATION_HOURS, DEFAULT_SESSION_DURATION_HOURS)
        .await
        .clamp(*SESSION_DURATION_RANGE.start(), *SESSION_DURATION_RANGE.end())
}

/// Webhook URL for offline alerts; empty means alerts are disabled.
pub async fn alert_webhook_url(settings: &dyn SettingsProvider) -> String {
    settings.get_string(KEY_ALERT_WEBHOOK_URL, "").await
}

/// Compare a supplied ingestion key against the configured one in
/// constant time.
///
/// An empty configured key means ingestion is disabled and every
/// supplied value is rejected. Length differences short-circuit, which
/// leaks only the length, not the content.
pub fn verify_ingestion_key(supplied: &str, configured: &str) -> bool {
    if configured.is_empty() || supplied.len() != configured.len() {
        return false;
    }
    supplied.as_bytes().ct_eq(configured.as_bytes()).unwrap_u8() == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSettings(HashMap<&'static str, String>);

    #[async_trait::async_trait]
    impl SettingsProvider for MapSettings {
        async fn get_string(&self, key: &str, default: &str) -> String {
            self.0.get(key).cloned().unwrap_or_else(|| default.to_string())
        }

        async fn get_int(&self, key: &str, default: i64) -> i64 {
            self.0
                .get(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    fn settings(pairs: &[(&'static str, &str)]) -> MapSettings {
        MapSettings(pairs.iter().map(|(k, v)| (*k, v.to_string())).collect())
    }

    #[tokio::test]
    async fn session_duration_defaults_to_48() {
        let s = settings(&[]);
        assert_eq!(session_duration_hours(&s).await, 48);
    }

    #[tokio::test]
    async fn session_duration_clamps_low_and_high() {
        let s = settings(&[(KEY_SESSION_DURATION_HOURS, "0")]);
        assert_eq!(session_duration_hours(&s).await, 1);

        let s = settings(&[(KEY_SESSION_DURATION_HOURS, "10000")]);
        assert_eq!(session_duration_hours(&s).await, 720);
    }

    #[tokio::test]
    async fn session_duration_in_range_passes_through() {
        let s = settings(&[(KEY_SESSION_DURATION_HOURS, "72")]);
        assert_eq!(session_duration_hours(&s).await, 72);
    }

    #[test]
    fn key_check_rejects_when_unconfigured() {
        assert!(!verify_ingestion_key("anything", ""));
        assert!(!verify_ingestion_key("", ""));
    }

    #[test]
    fn key_check_rejects_mismatch() {
        assert!(!verify_ingestion_key("wrong-key", "right-key"));
        assert!(!verify_ingestion_key("right-ke", "right-key"));
    }

    #[test]
    fn key_check_accepts_exact_match() {
        assert!(verify_ingestion_key("s3cret", "s3cret"));
    }
}
