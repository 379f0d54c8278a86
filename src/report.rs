//! # Period Report
//!
//! Summary statistics and chart series for a range of calendar days (UTC).
//! The cumulative rainfall in a series restarts at zero at the first sample
//! of the range instead of carrying the run-wide total.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::simulation::{round2, HistoryBuffer, Sample};

/// One chart point with range-relative cumulative rainfall
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub rainfall_mm: f64,
    pub cumulative_rainfall_mm: f64,
    pub moisture_pct: [f64; 3],
}

/// Rebuild the running rainfall total from the first sample given
pub fn recomputed_series<'a, I>(samples: I) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut running = 0.0;
    samples
        .into_iter()
        .map(|s| {
            running += s.rainfall_mm;
            SeriesPoint {
                timestamp: s.timestamp,
                rainfall_mm: s.rainfall_mm,
                cumulative_rainfall_mm: round2(running),
                moisture_pct: s.moisture(),
            }
        })
        .collect()
}

/// Upper bound of the 10-minute rainfall axis
pub fn rain_axis_max(max_rain_mm: f64) -> f64 {
    if max_rain_mm < 5.0 {
        6.0
    } else {
        max_rain_mm.ceil() + 1.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub samples: usize,
    pub total_rain_mm: f64,
    pub max_rain_10min_mm: f64,
    /// Mean moisture per depth, shallowest first
    pub mean_moisture_pct: [f64; 3],
    pub rain_axis_max: f64,
    pub series: Vec<SeriesPoint>,
}

impl ReportSummary {
    /// Summarise samples from `start_date` 00:00:00 to `end_date` 23:59:59.
    ///
    /// Returns `None` when no sample falls in the range.
    pub fn build(history: &HistoryBuffer, start_date: NaiveDate, end_date: NaiveDate) -> Option<Self> {
        let start = start_date.and_hms_opt(0, 0, 0)?.and_utc();
        let end = end_date.and_hms_opt(23, 59, 59)?.and_utc();

        let in_range: Vec<&Sample> = history.between(start, end).collect();
        if in_range.is_empty() {
            return None;
        }

        let count = in_range.len() as f64;
        let total_rain: f64 = in_range.iter().map(|s| s.rainfall_mm).sum();
        let max_rain = in_range
            .iter()
            .map(|s| s.rainfall_mm)
            .fold(0.0_f64, f64::max);
        let mean_moisture: [f64; 3] = std::array::from_fn(|depth| {
            round2(in_range.iter().map(|s| s.moisture()[depth]).sum::<f64>() / count)
        });

        Some(Self {
            start_date,
            end_date,
            samples: in_range.len(),
            total_rain_mm: round2(total_rain),
            max_rain_10min_mm: round2(max_rain),
            mean_moisture_pct: mean_moisture,
            rain_axis_max: rain_axis_max(max_rain),
            series: recomputed_series(in_range.iter().copied()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(ts: DateTime<Utc>, rain: f64, moisture: [f64; 3]) -> Sample {
        Sample {
            timestamp: ts,
            rainfall_mm: rain,
            cumulative_rainfall_mm: 500.0,
            moisture_depth1_pct: moisture[0],
            moisture_depth2_pct: moisture[1],
            moisture_depth3_pct: moisture[2],
        }
    }

    fn buffer(samples: Vec<Sample>) -> HistoryBuffer {
        let mut history = HistoryBuffer::new(samples.len());
        for s in samples {
            history.push(s);
        }
        history
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_axis_max() {
        assert_eq!(rain_axis_max(0.0), 6.0);
        assert_eq!(rain_axis_max(4.99), 6.0);
        assert_eq!(rain_axis_max(5.0), 6.0);
        assert_eq!(rain_axis_max(7.2), 9.0);
    }

    #[test]
    fn test_summary_over_day_range() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let history = buffer(vec![
            sample(midnight - Duration::seconds(1), 9.0, [40.0, 40.0, 40.0]),
            sample(midnight, 1.0, [28.0, 24.0, 22.0]),
            sample(midnight + Duration::hours(30), 2.5, [30.0, 26.0, 22.0]),
            sample(midnight + Duration::seconds(2 * 86_400 - 1), 0.5, [29.0, 25.0, 22.0]),
            sample(midnight + Duration::days(2), 4.0, [40.0, 40.0, 40.0]),
        ]);

        let report = ReportSummary::build(&history, day(2), day(3)).unwrap();
        assert_eq!(report.samples, 3);
        assert_eq!(report.total_rain_mm, 4.0);
        assert_eq!(report.max_rain_10min_mm, 2.5);
        assert_eq!(report.mean_moisture_pct, [29.0, 25.0, 22.0]);
        assert_eq!(report.rain_axis_max, 6.0);

        let cumulative: Vec<f64> = report.series.iter().map(|p| p.cumulative_rainfall_mm).collect();
        assert_eq!(cumulative, vec![1.0, 3.5, 4.0]);
    }

    #[test]
    fn test_empty_range() {
        let history = buffer(vec![sample(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            1.0,
            [28.0, 24.0, 22.0],
        )]);
        assert!(ReportSummary::build(&history, day(5), day(6)).is_none());
    }
}
