//! Bounded in-memory sample history.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use super::sample::Sample;

/// FIFO of produced samples, oldest first, evicting the oldest when full
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// The newest `n` samples, oldest first
    pub fn tail(&self, n: usize) -> impl DoubleEndedIterator<Item = &Sample> + Clone {
        self.samples.iter().skip(self.samples.len().saturating_sub(n))
    }

    /// Samples with `start <= timestamp <= end`
    pub fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl DoubleEndedIterator<Item = &Sample> + Clone {
        self.samples
            .iter()
            .filter(move |s| s.timestamp >= start && s.timestamp <= end)
    }
}

impl<'a> IntoIterator for &'a HistoryBuffer {
    type Item = &'a Sample;
    type IntoIter = std::collections::vec_deque::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(minute: i64) -> Sample {
        Sample {
            timestamp: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minute),
            rainfall_mm: 0.0,
            cumulative_rainfall_mm: 0.0,
            moisture_depth1_pct: 28.0,
            moisture_depth2_pct: 24.0,
            moisture_depth3_pct: 22.0,
        }
    }

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut buffer = HistoryBuffer::new(3);
        for m in 0..5 {
            buffer.push(sample(m * 10));
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.iter().next().unwrap().timestamp, sample(20).timestamp);
        assert_eq!(buffer.latest().unwrap().timestamp, sample(40).timestamp);
    }

    #[test]
    fn test_tail_and_between() {
        let mut buffer = HistoryBuffer::new(10);
        for m in 0..6 {
            buffer.push(sample(m * 10));
        }

        let tail: Vec<_> = buffer.tail(2).map(|s| s.timestamp).collect();
        assert_eq!(tail, vec![sample(40).timestamp, sample(50).timestamp]);
        assert_eq!(buffer.tail(100).count(), 6);

        let slice = buffer.between(sample(10).timestamp, sample(30).timestamp);
        assert_eq!(slice.count(), 3);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut buffer = HistoryBuffer::new(0);
        buffer.push(sample(0));
        buffer.push(sample(10));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.capacity(), 1);
    }
}
