//! # Samples and History Records
//!
//! [`Sample`] is what the generator produces. [`HistoryRecord`] is the
//! validated form of an externally sourced record: each field is checked once
//! at ingestion and anything malformed becomes `None`, so the engine only ever
//! sees typed optionals.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One 10-minute reading of the monitored site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "pluviometria_mm")]
    pub rainfall_mm: f64,
    #[serde(alias = "precipitacao_acumulada_mm")]
    pub cumulative_rainfall_mm: f64,
    #[serde(alias = "umidade_1m_perc")]
    pub moisture_depth1_pct: f64,
    #[serde(alias = "umidade_2m_perc")]
    pub moisture_depth2_pct: f64,
    #[serde(alias = "umidade_2m5_perc")]
    pub moisture_depth3_pct: f64,
}

impl Sample {
    /// Moisture of all three depths, shallowest first
    pub fn moisture(&self) -> [f64; 3] {
        [
            self.moisture_depth1_pct,
            self.moisture_depth2_pct,
            self.moisture_depth3_pct,
        ]
    }
}

/// Read access to the fields the engine consumes from history.
///
/// Every accessor is optional: history may come from a partially corrupt
/// external buffer and the engine skips whatever it cannot use.
pub trait Reading {
    fn timestamp(&self) -> Option<DateTime<Utc>>;
    fn rainfall_mm(&self) -> Option<f64>;
    fn cumulative_rainfall_mm(&self) -> Option<f64>;
}

impl Reading for Sample {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }

    fn rainfall_mm(&self) -> Option<f64> {
        Some(self.rainfall_mm)
    }

    fn cumulative_rainfall_mm(&self) -> Option<f64> {
        Some(self.cumulative_rainfall_mm)
    }
}

/// Externally sourced history entry after validation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub timestamp: Option<DateTime<Utc>>,
    pub rainfall_mm: Option<f64>,
    pub cumulative_rainfall_mm: Option<f64>,
}

impl HistoryRecord {
    /// Validate a dict-like JSON record.
    ///
    /// Accepts both the current field names and the legacy ones
    /// (`pluviometria_mm`, `precipitacao_acumulada_mm`). Non-object values
    /// yield an empty record.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let number = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| obj.get(*k))
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite() && *v >= 0.0)
        };

        Self {
            timestamp: obj
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            rainfall_mm: number(&["rainfall_mm", "pluviometria_mm", "rainfall"]),
            cumulative_rainfall_mm: number(&[
                "cumulative_rainfall_mm",
                "precipitacao_acumulada_mm",
            ]),
        }
    }

    /// True when the record carries everything the rolling windows need
    pub fn is_windowable(&self) -> bool {
        self.timestamp.is_some() && self.rainfall_mm.is_some()
    }
}

impl Reading for HistoryRecord {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn rainfall_mm(&self) -> Option<f64> {
        self.rainfall_mm
    }

    fn cumulative_rainfall_mm(&self) -> Option<f64> {
        self.cumulative_rainfall_mm
    }
}

/// Parse RFC 3339, falling back to naive ISO-8601 read as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Round to two decimals, the resolution of every published value
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
