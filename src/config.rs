use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::net::SocketAddr;

use crate::simulation::SimulationParams;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub simulation: SimulationConfig,
    pub alerts: AlertConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 15,
            enable_cors: false,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated minutes per tick
    pub tick_minutes: i64,
    /// Ticks generated per scheduler step
    pub ticks_per_step: usize,
    /// Wall-clock seconds between scheduler steps
    pub step_interval_secs: u64,
    /// Samples generated at start and on every restart
    pub prefill_samples: usize,
    pub history_capacity: usize,
    /// Seed for the rainfall random stream (None = entropy)
    pub random_seed: Option<u64>,
    pub params: SimulationParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_minutes: 10,
            ticks_per_step: 6,
            step_interval_secs: 2,
            prefill_samples: 10,
            history_capacity: 576,
            random_seed: None,
            params: SimulationParams::default(),
        }
    }
}

impl SimulationConfig {
    pub fn samples_per_hour(&self) -> usize {
        (60 / self.tick_minutes.max(1)).max(1) as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub check_interval_secs: u64,
    /// 72h rain accumulation thresholds (mm)
    pub rain_attention_mm: f64,
    pub rain_alert_mm: f64,
    pub rain_shutdown_mm: f64,
    /// Moisture above base at which each depth counts as elevated (%)
    pub soil_margin_pct: [f64; 3],
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 10,
            rain_attention_mm: 51.0,
            rain_alert_mm: 70.0,
            rain_shutdown_mm: 90.0,
            soil_margin_pct: [5.0, 5.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub email: EmailConfig,
    pub sms: SmsConfig,
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email: EmailConfig::default(),
            sms: SmsConfig::default(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub base_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub api_key: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub sender: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub recipient: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.smtp2go.com".to_string(),
            api_key: None,
            sender: None,
            recipient: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub base_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub api_key: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub sender_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sms.comtele.com.br".to_string(),
            api_key: None,
            sender_id: None,
            phone: None,
        }
    }
}

/// Accept numeric values for string settings.
///
/// Environment values that look like numbers (phone numbers, numeric keys)
/// reach serde as integers.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

/// Plain environment variables kept for existing deployments
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("NOTIFICATION_EMAIL", "notifications.email.recipient"),
    ("SENDER_EMAIL", "notifications.email.sender"),
    ("SMTP2GO_API_KEY", "notifications.email.api_key"),
    ("COMTELE_API_KEY", "notifications.sms.api_key"),
    ("COMTELE_SENDER_ID", "notifications.sms.sender_id"),
    ("NOTIFICATION_PHONE", "notifications.sms.phone"),
];

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Self::figment_with_file("config/default.toml")
    }

    /// Defaults, then `path` if it exists, then the environment
    pub fn figment_with_file(path: &str) -> Figment {
        let legacy_names: Vec<&str> = LEGACY_ENV.iter().map(|(name, _)| *name).collect();

        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("RISKGEO__").split("__"))
            .merge(Env::raw().only(&legacy_names).map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                    .map(|(_, path)| (*path).into())
                    .unwrap_or_else(|| key.as_str().into())
            }))
    }
}
