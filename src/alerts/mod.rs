//! # Risk Alert Levels
//!
//! Classifies the monitored site on two independent scales:
//! - **Rain**: total rainfall over the 72h window ending at the newest sample
//! - **Soil**: moisture of the newest sample against each depth's base level
//!
//! [`monitor::AlertMonitor`] tracks transitions between levels and turns the
//! ones worth notifying about into [`monitor::AlertEvent`]s.

pub mod monitor;

pub use monitor::{AlertEvent, AlertMonitor, AlertSource};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::config::AlertConfig;
use crate::simulation::Sample;

/// Site risk level, ordered by severity
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum AlertLevel {
    #[default]
    Clear,
    Attention,
    Alert,
    Shutdown,
}

impl AlertLevel {
    /// Display color used by dashboards
    pub fn color(self) -> &'static str {
        match self {
            AlertLevel::Clear => "green",
            AlertLevel::Attention => "gold",
            AlertLevel::Alert => "orange",
            AlertLevel::Shutdown => "red",
        }
    }

    /// Gauge fill for the soil indicator (%)
    pub fn height_percent(self) -> u8 {
        match self {
            AlertLevel::Clear => 15,
            AlertLevel::Attention => 50,
            AlertLevel::Alert => 75,
            AlertLevel::Shutdown => 100,
        }
    }
}

/// Rainfall over the 72h ending at the newest sample, inclusive of the boundary
pub fn rain_accumulated_72h<'a, I>(history: I) -> f64
where
    I: IntoIterator<Item = &'a Sample>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut newest_first = history.into_iter().rev().peekable();
    let Some(latest) = newest_first.peek().map(|s| s.timestamp) else {
        return 0.0;
    };
    let limit = latest - Duration::hours(72);

    newest_first
        .filter(|s| s.timestamp >= limit)
        .map(|s| s.rainfall_mm)
        .sum()
}

pub fn rain_level(accumulated_72h: f64, config: &AlertConfig) -> AlertLevel {
    if accumulated_72h >= config.rain_shutdown_mm {
        AlertLevel::Shutdown
    } else if accumulated_72h >= config.rain_alert_mm {
        AlertLevel::Alert
    } else if accumulated_72h >= config.rain_attention_mm {
        AlertLevel::Attention
    } else {
        AlertLevel::Clear
    }
}

/// Classify soil moisture of `latest` against `base_pct` plus the configured margins
pub fn soil_level(latest: Option<&Sample>, base_pct: &[f64; 3], config: &AlertConfig) -> AlertLevel {
    let Some(sample) = latest else {
        return AlertLevel::Clear;
    };

    let moisture = sample.moisture();
    let elevated: [bool; 3] =
        std::array::from_fn(|i| moisture[i] >= base_pct[i] + config.soil_margin_pct[i]);

    match elevated {
        [true, true, true] => AlertLevel::Shutdown,
        [_, true, true] | [true, true, false] => AlertLevel::Alert,
        [_, false, true] | [true, false, false] => AlertLevel::Attention,
        _ => AlertLevel::Clear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;

    const BASE: [f64; 3] = [28.0, 24.0, 22.0];

    fn at(minutes: i64, rain: f64) -> Sample {
        sample_with(minutes, rain, BASE)
    }

    fn sample_with(minutes: i64, rain: f64, moisture: [f64; 3]) -> Sample {
        let t0: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        Sample {
            timestamp: t0 + Duration::minutes(minutes),
            rainfall_mm: rain,
            cumulative_rainfall_mm: 0.0,
            moisture_depth1_pct: moisture[0],
            moisture_depth2_pct: moisture[1],
            moisture_depth3_pct: moisture[2],
        }
    }

    #[rstest]
    #[case(0.0, AlertLevel::Clear)]
    #[case(50.99, AlertLevel::Clear)]
    #[case(51.0, AlertLevel::Attention)]
    #[case(70.0, AlertLevel::Alert)]
    #[case(89.99, AlertLevel::Alert)]
    #[case(90.0, AlertLevel::Shutdown)]
    fn test_rain_level_thresholds(#[case] accumulated: f64, #[case] expected: AlertLevel) {
        assert_eq!(rain_level(accumulated, &AlertConfig::default()), expected);
    }

    #[rstest]
    #[case([28.0, 24.0, 22.0], AlertLevel::Clear)]
    #[case([33.0, 24.0, 22.0], AlertLevel::Attention)]
    #[case([28.0, 24.0, 23.0], AlertLevel::Attention)]
    #[case([28.0, 29.0, 22.0], AlertLevel::Clear)]
    #[case([33.0, 29.0, 22.0], AlertLevel::Alert)]
    #[case([28.0, 29.0, 23.0], AlertLevel::Alert)]
    #[case([33.0, 24.0, 23.0], AlertLevel::Attention)]
    #[case([33.0, 29.0, 23.0], AlertLevel::Shutdown)]
    fn test_soil_level_rules(#[case] moisture: [f64; 3], #[case] expected: AlertLevel) {
        let sample = sample_with(0, 0.0, moisture);
        assert_eq!(
            soil_level(Some(&sample), &BASE, &AlertConfig::default()),
            expected
        );
    }

    #[test]
    fn test_soil_level_without_samples() {
        assert_eq!(soil_level(None, &BASE, &AlertConfig::default()), AlertLevel::Clear);
    }

    #[test]
    fn test_accumulation_anchored_at_latest_sample() {
        let history = vec![
            at(0, 40.0),
            at(20, 5.0),
            at(72 * 60 + 10, 2.0),
            at(72 * 60 + 20, 1.0),
        ];

        // 72h20m before the newest falls out, exactly 72h stays in
        assert_eq!(rain_accumulated_72h(&history), 8.0);
        assert_eq!(rain_accumulated_72h(&Vec::<Sample>::new()), 0.0);
    }

    #[test]
    fn test_level_metadata() {
        assert_eq!(AlertLevel::Shutdown.color(), "red");
        assert_eq!(AlertLevel::Attention.height_percent(), 50);
        assert_eq!(AlertLevel::Alert.to_string(), "Alert");
        assert!(AlertLevel::Shutdown > AlertLevel::Alert);
    }
}
