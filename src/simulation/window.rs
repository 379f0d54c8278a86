//! Trailing 24h / 72h rainfall sums over supplied history.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::sample::Reading;

/// Rainfall accumulated inside the two trailing windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowSums {
    pub sum_24h: f64,
    pub sum_72h: f64,
}

/// Sum rainfall over the trailing 24h and 72h windows ending at `now`.
///
/// History must be ordered oldest to newest. The walk goes newest first and
/// stops at the first entry strictly older than the 72h boundary. Entries
/// without a usable timestamp or rainfall are skipped.
pub fn rolling_sums<'a, R, I>(history: I, now: DateTime<Utc>) -> WindowSums
where
    R: Reading + 'a,
    I: IntoIterator<Item = &'a R>,
    I::IntoIter: DoubleEndedIterator,
{
    let limit_24h = now - Duration::hours(24);
    let limit_72h = now - Duration::hours(72);
    let mut sums = WindowSums::default();

    for entry in history.into_iter().rev() {
        let (Some(ts), Some(rain)) = (entry.timestamp(), entry.rainfall_mm()) else {
            continue;
        };
        if ts < limit_72h {
            break;
        }
        if ts > limit_72h {
            sums.sum_72h += rain;
            if ts > limit_24h {
                sums.sum_24h += rain;
            }
        }
    }

    sums
}
