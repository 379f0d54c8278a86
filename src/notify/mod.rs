//! # Alert Notifications
//!
//! Delivers [`AlertEvent`]s over e-mail (SMTP2GO HTTP API) and SMS (Comtele
//! HTTP API). Channels with incomplete configuration are skipped at startup;
//! delivery failures are logged and never stop the monitor.

pub mod email;
pub mod sms;

pub use email::EmailNotifier;
pub use sms::SmsNotifier;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::alerts::AlertEvent;
use crate::config::NotificationConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{channel} channel not configured: missing {field}")]
    NotConfigured {
        channel: &'static str,
        field: &'static str,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected the message: {0}")]
    Rejected(String),
}

/// A delivery channel for alert events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> &'static str;

    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError>;
}

/// Read a setting that must be present and non-blank
pub(crate) fn required(
    value: &Option<String>,
    channel: &'static str,
    field: &'static str,
) -> Result<String, NotifyError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(NotifyError::NotConfigured { channel, field })
}

/// Fans events out to every configured channel
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Register every channel whose settings are complete
    pub fn from_config(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

        match EmailNotifier::from_config(&config.email, timeout) {
            Ok(notifier) => notifiers.push(Arc::new(notifier)),
            Err(e @ NotifyError::NotConfigured { .. }) => warn!("E-mail alerts disabled: {e}"),
            Err(e) => return Err(e),
        }
        match SmsNotifier::from_config(&config.sms, timeout) {
            Ok(notifier) => notifiers.push(Arc::new(notifier)),
            Err(e @ NotifyError::NotConfigured { .. }) => warn!("SMS alerts disabled: {e}"),
            Err(e) => return Err(e),
        }

        Ok(Self { notifiers })
    }

    pub fn channels(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.channel()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Fire-and-forget delivery, one task per channel
    pub fn dispatch(&self, event: AlertEvent) -> Vec<JoinHandle<()>> {
        let event = Arc::new(event);
        self.notifiers
            .iter()
            .cloned()
            .map(|notifier| {
                let event = Arc::clone(&event);
                tokio::spawn(async move {
                    log_outcome(notifier.channel(), &event, &notifier.notify(&event).await);
                })
            })
            .collect()
    }

    /// Deliver to every channel in turn and return each outcome
    pub async fn deliver(&self, event: &AlertEvent) -> Vec<(&'static str, Result<(), NotifyError>)> {
        let mut outcomes = Vec::with_capacity(self.notifiers.len());
        for notifier in &self.notifiers {
            let result = notifier.notify(event).await;
            log_outcome(notifier.channel(), event, &result);
            outcomes.push((notifier.channel(), result));
        }
        outcomes
    }
}

fn log_outcome(channel: &str, event: &AlertEvent, result: &Result<(), NotifyError>) {
    match result {
        Ok(()) => info!(channel, event_id = %event.id, level = %event.level, "Alert notification sent"),
        Err(e) => error!(channel, event_id = %event.id, "Alert notification failed: {e}"),
    }
}
