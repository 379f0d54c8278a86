use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{required, Notifier, NotifyError};
use crate::alerts::AlertEvent;
use crate::config::EmailConfig;

const CHANNEL: &str = "email";

/// SMTP2GO `v3/email/send` client
#[derive(Clone)]
pub struct EmailNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sender: String,
    recipient: String,
}

impl EmailNotifier {
    pub fn from_config(config: &EmailConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let api_key = required(&config.api_key, CHANNEL, "api_key")?;
        let sender = required(&config.sender, CHANNEL, "sender")?;
        let recipient = required(&config.recipient, CHANNEL, "recipient")?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            sender,
            recipient,
        })
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    api_key: &'a str,
    sender: &'a str,
    to: [&'a str; 1],
    subject: String,
    text_body: String,
}

#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    #[serde(default)]
    data: SendData,
}

#[derive(Debug, Default, Deserialize)]
struct SendData {
    #[serde(default)]
    succeeded: u64,
    #[serde(default)]
    failures: Value,
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        CHANNEL
    }

    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        let request = SendRequest {
            api_key: &self.api_key,
            sender: &self.sender,
            to: [&self.recipient],
            subject: event.email_subject(),
            text_body: event.email_body(),
        };

        let resp = self
            .client
            .post(format!("{}/v3/email/send", self.base_url))
            .json(&request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        let parsed: SendResponse = serde_json::from_str(&body)
            .map_err(|_| NotifyError::Rejected(format!("HTTP {status}: non-JSON response: {body}")))?;

        if status == reqwest::StatusCode::OK && parsed.data.succeeded > 0 {
            Ok(())
        } else if parsed.data.failures.is_null() {
            Err(NotifyError::Rejected(format!("HTTP {status}: unknown failure")))
        } else {
            Err(NotifyError::Rejected(parsed.data.failures.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertLevel, AlertSource};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(server: &MockServer) -> EmailNotifier {
        let config = EmailConfig {
            base_url: server.uri(),
            api_key: Some("api-123".into()),
            sender: Some("monitor@example.com".into()),
            recipient: Some("ops@example.com".into()),
        };
        EmailNotifier::from_config(&config, Duration::from_secs(5)).unwrap()
    }

    fn event() -> AlertEvent {
        AlertEvent::new(
            AlertSource::Rain,
            AlertLevel::Shutdown,
            AlertLevel::Alert,
            Utc.with_ymd_and_hms(2024, 9, 3, 14, 25, 0).unwrap(),
            Some(92.0),
        )
    }

    #[tokio::test]
    async fn test_sends_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/email/send"))
            .and(body_partial_json(json!({
                "api_key": "api-123",
                "sender": "monitor@example.com",
                "to": ["ops@example.com"],
                "subject": "[SHUTDOWN ALERT] Rain - 2024-09-03 14:25",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"succeeded": 1, "failed": 0}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server).notify(&event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_reports_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"succeeded": 0, "failures": ["bad sender"]}})),
            )
            .mount(&server)
            .await;

        let err = notifier(&server).notify(&event()).await.unwrap_err();
        match err {
            NotifyError::Rejected(msg) => assert!(msg.contains("bad sender")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_requires_recipient() {
        let config = EmailConfig {
            api_key: Some("api-123".into()),
            sender: Some("monitor@example.com".into()),
            ..Default::default()
        };
        let err = EmailNotifier::from_config(&config, Duration::from_secs(5)).err().unwrap();
        assert!(matches!(
            err,
            NotifyError::NotConfigured {
                field: "recipient",
                ..
            }
        ));
    }
}
