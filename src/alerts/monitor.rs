//! Alert transition tracking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{rain_accumulated_72h, rain_level, soil_level, AlertLevel};
use crate::config::AlertConfig;
use crate::simulation::Sample;

const SMS_MAX_CHARS: usize = 160;

/// Which scale raised an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum AlertSource {
    Rain,
    Soil,
}

/// Both levels for one history snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub rain_level: AlertLevel,
    pub soil_level: AlertLevel,
    pub accumulated_72h: f64,
}

impl Assessment {
    pub fn of<'a, I>(history: I, base_pct: &[f64; 3], config: &AlertConfig) -> Self
    where
        I: IntoIterator<Item = &'a Sample>,
        I::IntoIter: DoubleEndedIterator + Clone,
    {
        let mut history = history.into_iter();
        let accumulated_72h = rain_accumulated_72h(history.clone());
        let latest = history.next_back();

        Self {
            rain_level: rain_level(accumulated_72h, config),
            soil_level: soil_level(latest, base_pct, config),
            accumulated_72h,
        }
    }
}

/// A level transition that should reach the notification channels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub source: AlertSource,
    pub level: AlertLevel,
    pub previous: AlertLevel,
    pub raised_at: DateTime<Utc>,
    /// Only set for rain events
    pub accumulated_72h: Option<f64>,
}

impl AlertEvent {
    pub fn new(
        source: AlertSource,
        level: AlertLevel,
        previous: AlertLevel,
        raised_at: DateTime<Utc>,
        accumulated_72h: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            level,
            previous,
            raised_at,
            accumulated_72h,
        }
    }

    pub fn is_normalization(&self) -> bool {
        self.level == AlertLevel::Clear
    }

    pub fn email_subject(&self) -> String {
        let when = self.raised_at.format("%Y-%m-%d %H:%M");
        match (self.source, self.level) {
            (AlertSource::Soil, AlertLevel::Clear) => format!("[NORMALIZED] Soil moisture - {when}"),
            (source, AlertLevel::Shutdown) => format!("[SHUTDOWN ALERT] {source} - {when}"),
            (source, _) => format!("[ALERT] {source} - {when}"),
        }
    }

    pub fn email_body(&self) -> String {
        let when = self.raised_at.format("%Y-%m-%d %H:%M");
        if self.is_normalization() {
            return format!(
                "Simulated monitoring returned to level Clear for soil moisture.\n\n\
                 - Previous level: {}\n- Time: {when}",
                self.previous
            );
        }

        let cause = match self.source {
            AlertSource::Rain => "RAINFALL",
            AlertSource::Soil => "SOIL MOISTURE",
        };
        let mut body = format!(
            "Simulated monitoring reached level {} due to {cause}.\n\n",
            self.level.to_string().to_uppercase()
        );
        match self.accumulated_72h {
            Some(total) => body.push_str(&format!("- 72h accumulation: {total:.2} mm\n")),
            None => body.push_str(&format!("- Current level: {}\n", self.level)),
        }
        body.push_str(&format!("- Previous level: {}\n- Time: {when}", self.previous));
        body
    }

    /// Plain text for SMS, at most 160 characters
    pub fn sms_text(&self) -> String {
        let when = self.raised_at.format("%H:%M");
        let text = match (self.source, self.accumulated_72h) {
            (AlertSource::Soil, _) if self.is_normalization() => format!(
                "NORMALIZED (Soil moisture): back to Clear. Prev level: {}. Time: {when}",
                self.previous
            ),
            (AlertSource::Rain, Some(total)) => format!(
                "{} (Rain): 72h acc={total:.1}mm. Prev level: {}. Time: {when}",
                self.headline(),
                self.previous
            ),
            (source, _) => format!(
                "{} ({source}): level {}. Prev level: {}. Time: {when}",
                self.headline(),
                self.level,
                self.previous
            ),
        };
        text.chars().take(SMS_MAX_CHARS).collect()
    }

    fn headline(&self) -> &'static str {
        if self.level == AlertLevel::Shutdown {
            "SHUTDOWN ALERT"
        } else {
            "ALERT"
        }
    }
}

/// Remembers the last rain and soil levels and reports notifiable transitions.
///
/// - rain: entering Shutdown
/// - soil: entering Alert or Shutdown, and returning to Clear
#[derive(Debug, Clone)]
pub struct AlertMonitor {
    config: AlertConfig,
    last_rain: AlertLevel,
    last_soil: AlertLevel,
}

impl AlertMonitor {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            last_rain: AlertLevel::Clear,
            last_soil: AlertLevel::Clear,
        }
    }

    /// Last evaluated (rain, soil) levels
    pub fn levels(&self) -> (AlertLevel, AlertLevel) {
        (self.last_rain, self.last_soil)
    }

    pub fn reset(&mut self) {
        self.last_rain = AlertLevel::Clear;
        self.last_soil = AlertLevel::Clear;
    }

    pub fn evaluate<'a, I>(
        &mut self,
        history: I,
        base_pct: &[f64; 3],
        raised_at: DateTime<Utc>,
    ) -> Vec<AlertEvent>
    where
        I: IntoIterator<Item = &'a Sample>,
        I::IntoIter: DoubleEndedIterator + Clone,
    {
        let now = Assessment::of(history, base_pct, &self.config);
        let mut events = Vec::new();

        if now.rain_level == AlertLevel::Shutdown && self.last_rain != AlertLevel::Shutdown {
            warn!(
                accumulated_72h = now.accumulated_72h,
                previous = %self.last_rain,
                "Rain reached shutdown level"
            );
            events.push(AlertEvent::new(
                AlertSource::Rain,
                now.rain_level,
                self.last_rain,
                raised_at,
                Some(now.accumulated_72h),
            ));
        }

        if now.soil_level != self.last_soil {
            match now.soil_level {
                AlertLevel::Shutdown | AlertLevel::Alert => {
                    warn!(level = %now.soil_level, previous = %self.last_soil, "Soil moisture level raised");
                    events.push(AlertEvent::new(
                        AlertSource::Soil,
                        now.soil_level,
                        self.last_soil,
                        raised_at,
                        None,
                    ));
                }
                AlertLevel::Attention => {
                    info!(previous = %self.last_soil, "Soil moisture reached attention level");
                }
                AlertLevel::Clear => {
                    info!(previous = %self.last_soil, "Soil moisture back to clear");
                    events.push(AlertEvent::new(
                        AlertSource::Soil,
                        AlertLevel::Clear,
                        self.last_soil,
                        raised_at,
                        None,
                    ));
                }
            }
        }

        self.last_rain = now.rain_level;
        self.last_soil = now.soil_level;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const BASE: [f64; 3] = [28.0, 24.0, 22.0];

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 3, 14, 25, 0).unwrap()
    }

    fn sample(rain: f64, moisture: [f64; 3]) -> Sample {
        Sample {
            timestamp: t0(),
            rainfall_mm: rain,
            cumulative_rainfall_mm: rain,
            moisture_depth1_pct: moisture[0],
            moisture_depth2_pct: moisture[1],
            moisture_depth3_pct: moisture[2],
        }
    }

    #[test]
    fn test_rain_shutdown_fires_once() {
        let mut monitor = AlertMonitor::new(AlertConfig::default());
        let history = vec![sample(95.0, BASE)];

        let events = monitor.evaluate(&history, &BASE, t0());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, AlertSource::Rain);
        assert_eq!(events[0].previous, AlertLevel::Clear);
        assert_eq!(events[0].accumulated_72h, Some(95.0));

        assert!(monitor.evaluate(&history, &BASE, t0()).is_empty());
        assert_eq!(monitor.levels(), (AlertLevel::Shutdown, AlertLevel::Clear));
    }

    #[test]
    fn test_soil_transitions() {
        let mut monitor = AlertMonitor::new(AlertConfig::default());

        // attention is logged only
        let attention = vec![sample(0.0, [33.0, 24.0, 22.0])];
        assert!(monitor.evaluate(&attention, &BASE, t0()).is_empty());

        let alert = vec![sample(0.0, [33.0, 29.0, 22.0])];
        let events = monitor.evaluate(&alert, &BASE, t0());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, AlertLevel::Alert);
        assert_eq!(events[0].previous, AlertLevel::Attention);

        let clear = vec![sample(0.0, BASE)];
        let events = monitor.evaluate(&clear, &BASE, t0() + Duration::minutes(10));
        assert_eq!(events.len(), 1);
        assert!(events[0].is_normalization());
        assert_eq!(events[0].previous, AlertLevel::Alert);
    }

    #[test]
    fn test_reset_forgets_levels() {
        let mut monitor = AlertMonitor::new(AlertConfig::default());
        let history = vec![sample(95.0, [33.0, 29.0, 23.0])];

        assert_eq!(monitor.evaluate(&history, &BASE, t0()).len(), 2);
        monitor.reset();
        assert_eq!(monitor.levels(), (AlertLevel::Clear, AlertLevel::Clear));
        assert_eq!(monitor.evaluate(&history, &BASE, t0()).len(), 2);
    }

    #[test]
    fn test_message_rendering() {
        let event = AlertEvent::new(
            AlertSource::Rain,
            AlertLevel::Shutdown,
            AlertLevel::Alert,
            t0(),
            Some(91.234),
        );

        assert_eq!(event.email_subject(), "[SHUTDOWN ALERT] Rain - 2024-09-03 14:25");
        assert!(event.email_body().contains("- 72h accumulation: 91.23 mm"));
        assert!(event.email_body().contains("- Previous level: Alert"));
        assert_eq!(
            event.sms_text(),
            "SHUTDOWN ALERT (Rain): 72h acc=91.2mm. Prev level: Alert. Time: 14:25"
        );

        let normalized = AlertEvent::new(
            AlertSource::Soil,
            AlertLevel::Clear,
            AlertLevel::Shutdown,
            t0(),
            None,
        );
        assert_eq!(
            normalized.email_subject(),
            "[NORMALIZED] Soil moisture - 2024-09-03 14:25"
        );
        assert!(normalized.sms_text().starts_with("NORMALIZED"));
        assert!(normalized.sms_text().chars().count() <= 160);
    }
}
