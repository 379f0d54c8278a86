use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{required, Notifier, NotifyError};
use crate::alerts::AlertEvent;
use crate::config::SmsConfig;

const CHANNEL: &str = "sms";

/// Comtele `api/v2/send` client (form-encoded)
#[derive(Clone)]
pub struct SmsNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sender_id: String,
    phone: String,
}

impl SmsNotifier {
    pub fn from_config(config: &SmsConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let api_key = required(&config.api_key, CHANNEL, "api_key")?;
        let sender_id = required(&config.sender_id, CHANNEL, "sender_id")?;
        let phone = required(&config.phone, CHANNEL, "phone")?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            sender_id,
            // provider expects digits only
            phone: phone.trim_start_matches('+').to_string(),
        })
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "Success", default)]
    success: bool,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[async_trait]
impl Notifier for SmsNotifier {
    fn channel(&self) -> &'static str {
        CHANNEL
    }

    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        let content = event.sms_text();
        let form = [
            ("Sender", self.sender_id.as_str()),
            ("Receivers", self.phone.as_str()),
            ("Content", content.as_str()),
        ];

        let resp = self
            .client
            .post(format!("{}/api/v2/send", self.base_url))
            .header("auth-key", &self.api_key)
            .form(&form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        let parsed: SendResponse = serde_json::from_str(&body)
            .map_err(|_| NotifyError::Rejected(format!("HTTP {status}: non-JSON response: {body}")))?;

        if parsed.success {
            Ok(())
        } else {
            Err(NotifyError::Rejected(
                parsed
                    .message
                    .unwrap_or_else(|| format!("HTTP {status}: no error message")),
            ))
        }
    }
}
