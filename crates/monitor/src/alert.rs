//! Webhook delivery for offline alerts.

use std::time::Duration;

use gatekeep_db::models::access_point::AccessPoint;

/// Delay before each delivery attempt, relative to the prior one.
/// The first success stops the sequence.
const ATTEMPT_DELAYS: [Duration; 3] = [
    Duration::from_secs(0),
    Duration::from_secs(2),
    Duration::from_secs(5),
];

/// HTTP timeout for a single webhook POST.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts offline notifications to a configured webhook.
#[derive(Debug, Clone)]
pub struct AlertSender {
    client: reqwest::Client,
}

impl Default for AlertSender {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSender {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Notify the webhook that an access point went offline.
    ///
    /// Fire-and-forget: an empty URL is a no-op, and exhausting all
    /// attempts only logs. The caller never sees a failure.
    pub async fn notify_offline(&self, webhook_url: &str, ap: &AccessPoint) {
        if webhook_url.is_empty() {
            tracing::debug!(ap = %ap.name, "No alert webhook configured, skipping");
            return;
        }

        let message = offline_message(ap, chrono::Local::now());
        // Some receivers read `text`, others `content`; send both.
        let payload = serde_json::json!({
            "text": message,
            "content": message,
        });

        for (attempt, delay) in ATTEMPT_DELAYS.iter().enumerate() {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
            match self.client.post(webhook_url).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(ap = %ap.name, attempt = attempt + 1, "Offline alert delivered");
                    return;
                }
                Ok(response) => {
                    tracing::warn!(
                        ap = %ap.name,
                        attempt = attempt + 1,
                        status = %response.status(),
                        "Webhook rejected offline alert"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        ap = %ap.name,
                        attempt = attempt + 1,
                        error = %e,
                        "Failed to deliver offline alert"
                    );
                }
            }
        }

        tracing::error!(ap = %ap.name, "Offline alert dropped after all delivery attempts");
    }
}

/// Build the human-readable alert message.
fn offline_message(ap: &AccessPoint, now: chrono::DateTime<chrono::Local>) -> String {
    let mut message = format!("AP OFFLINE: {} ({})", ap.name, ap.ip_address);
    if let Some(location) = ap.location.as_deref().filter(|l| !l.is_empty()) {
        message.push_str(&format!(" - {location}"));
    }
    message.push_str(&format!(" | {}", now.format("%d/%m/%Y %H:%M:%S")));
    message
}
