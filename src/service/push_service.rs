// service/push_service.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::config::Config;
use crate::utils::time::next_business_time;

// Thin REST client for the push provider. Recipients are addressed by email
// tags; delivery is best-effort and the caller decides whether a failure
// matters.
#[derive(Debug, Clone)]
pub struct PushService {
    client: reqwest::Client,
    config: Config,
}

#[derive(Debug, Clone)]
pub struct PushRecipient {
    pub email: String,
}

const PUSH_API_URL: &str = "https://onesignal.com/api/v1/notifications";

impl PushService {
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.notify_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    pub async fn send_to_users(
        &self,
        recipients: &[PushRecipient],
        job_id: uuid::Uuid,
        mut data: serde_json::Value,
        message: &str,
        delayed: bool,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        if recipients.is_empty() {
            return Ok(());
        }

        let (app_id, api_key) = self.config.active_push_credentials();

        let tags: Vec<serde_json::Value> = recipients
            .iter()
            .map(|recipient| {
                json!({
                    "key": "email",
                    "relation": "=",
                    "value": recipient.email.to_lowercase(),
                })
            })
            .collect();

        data["job_id"] = json!(job_id);

        // Booking broadcasts get a distinct sound for emergencies.
        let (android_sound, ios_sound) =
            match (data["notification_type"].as_str(), data["immediate"].as_bool()) {
                (Some("suitable_job"), Some(false)) => ("normal_booking", "normal_booking.mp3"),
                (Some("suitable_job"), _) => ("emergency_booking", "emergency_booking.mp3"),
                _ => ("default", "default"),
            };

        let mut fields = json!({
            "app_id": app_id,
            "tags": tags,
            "data": data,
            "title": { "en": "Lingobook" },
            "contents": { "en": message },
            "ios_badgeType": "Increase",
            "ios_badgeCount": 1,
            "android_sound": android_sound,
            "ios_sound": ios_sound,
        });

        if delayed {
            fields["send_after"] = json!(next_business_time(now).to_rfc3339());
        }

        tracing::info!("Push send for job {} to {} users", job_id, recipients.len());

        let response = self
            .client
            .post(PUSH_API_URL)
            .header("Authorization", format!("Basic {}", api_key))
            .json(&fields)
            .send()
            .await
            .map_err(|e| format!("Push network error: {}", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "No response body".to_string());

        if status.is_success() {
            tracing::info!("Push send for job {} answered: {}", job_id, body);
            Ok(())
        } else {
            Err(format!("Push API error ({}): {}", status.as_u16(), body))
        }
    }
}
