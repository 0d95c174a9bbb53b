//! Progress accounting and rate estimation.

use std::time::Instant;

use crate::{MAX_PROGRESS_SAMPLES, RATE_WINDOW};

/// How throughput is derived from delivered bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateMode {
    /// Cumulative bytes over elapsed session time, the arithmetic the web
    /// front end uses. Elapsed time is floored at one second so the first
    /// chunk cannot produce an absurd rate. Stable, but slow to react.
    #[default]
    SessionAverage,
    /// Rate over the retained sample window. Needs at least two samples.
    Windowed,
}

#[derive(Debug, Clone, Copy)]
struct ProgressSample {
    at: Instant,
    cumulative_bytes: u64,
}

/// Accumulates delivery events and answers progress queries.
///
/// Safe to query at any moment: before the first delivery every rate
/// accessor answers `None` rather than a numeric artifact, and no query
/// ever returns `NaN` or an infinity.
#[derive(Debug)]
pub struct ProgressEstimator {
    started_at: Instant,
    mode: RateMode,
    cumulative_bytes: u64,
    samples: Vec<ProgressSample>,
}

impl ProgressEstimator {
    /// Creates an estimator; the session clock starts now.
    pub fn new(mode: RateMode) -> Self {
        Self {
            started_at: Instant::now(),
            mode,
            cumulative_bytes: 0,
            samples: Vec::new(),
        }
    }

    /// Records `count` more bytes delivered.
    pub fn on_bytes_delivered(&mut self, count: u64) {
        self.cumulative_bytes += count;
        let now = Instant::now();
        self.samples.push(ProgressSample {
            at: now,
            cumulative_bytes: self.cumulative_bytes,
        });

        if let Some(cutoff) = now.checked_sub(RATE_WINDOW) {
            self.samples.retain(|s| s.at >= cutoff);
        }
        if self.samples.len() > MAX_PROGRESS_SAMPLES {
            let excess = self.samples.len() - MAX_PROGRESS_SAMPLES;
            self.samples.drain(..excess);
        }
    }

    /// Bytes delivered so far.
    pub fn cumulative_bytes(&self) -> u64 {
        self.cumulative_bytes
    }

    /// Percent complete against `total_bytes`; 0.0 while the total is
    /// unknown, capped at 100.0.
    pub fn percent(&self, total_bytes: Option<u64>) -> f64 {
        match total_bytes {
            Some(total) if total > 0 => {
                (self.cumulative_bytes as f64 / total as f64 * 100.0).min(100.0)
            }
            _ => 0.0,
        }
    }

    /// Current throughput in bytes per second, `None` until it can be
    /// computed.
    pub fn throughput_bytes_per_second(&self) -> Option<f64> {
        match self.mode {
            RateMode::SessionAverage => {
                if self.samples.is_empty() {
                    return None;
                }
                let elapsed = self.started_at.elapsed().as_secs_f64().max(1.0);
                Some(self.cumulative_bytes as f64 / elapsed)
            }
            RateMode::Windowed => {
                if self.samples.len() < 2 {
                    return None;
                }
                let first = self.samples[0];
                let last = self.samples[self.samples.len() - 1];
                let elapsed = last.at.duration_since(first.at);
                if elapsed.is_zero() {
                    return None;
                }
                let bytes = last.cumulative_bytes - first.cumulative_bytes;
                Some(bytes as f64 / elapsed.as_secs_f64())
            }
        }
    }

    /// Estimated seconds until `total_bytes` is reached.
    ///
    /// `None` while the total or the rate is unknown, or when the rate is
    /// zero and no estimate makes sense.
    pub fn eta_seconds(&self, total_bytes: Option<u64>) -> Option<f64> {
        let total = total_bytes?;
        let rate = self.throughput_bytes_per_second()?;
        if rate <= 0.0 {
            return None;
        }
        let remaining = total.saturating_sub(self.cumulative_bytes);
        Some(remaining as f64 / rate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn no_samples_means_unknown_rate() {
        let estimator = ProgressEstimator::new(RateMode::SessionAverage);
        assert_eq!(estimator.throughput_bytes_per_second(), None);
        assert_eq!(estimator.eta_seconds(Some(1000)), None);
        assert_eq!(estimator.percent(Some(1000)), 0.0);
    }

    #[test]
    fn percent_without_total_is_zero() {
        let mut estimator = ProgressEstimator::new(RateMode::SessionAverage);
        estimator.on_bytes_delivered(500);
        assert_eq!(estimator.percent(None), 0.0);
        assert_eq!(estimator.percent(Some(0)), 0.0);
    }

    #[test]
    fn percent_tracks_cumulative_bytes() {
        let mut estimator = ProgressEstimator::new(RateMode::SessionAverage);
        estimator.on_bytes_delivered(250);
        assert_eq!(estimator.percent(Some(1000)), 25.0);
        estimator.on_bytes_delivered(750);
        assert_eq!(estimator.percent(Some(1000)), 100.0);
    }

    #[test]
    fn percent_is_capped_at_one_hundred() {
        let mut estimator = ProgressEstimator::new(RateMode::SessionAverage);
        estimator.on_bytes_delivered(2000);
        assert_eq!(estimator.percent(Some(1000)), 100.0);
    }

    #[test]
    fn session_average_floors_elapsed_at_one_second() {
        let mut estimator = ProgressEstimator::new(RateMode::SessionAverage);
        estimator.on_bytes_delivered(1000);

        // Immediately after delivery the elapsed floor caps the rate at
        // bytes-per-one-second.
        let rate = estimator.throughput_bytes_per_second().unwrap();
        assert!(rate > 0.0);
        assert!(rate <= 1000.0);
    }

    #[test]
    fn windowed_needs_two_samples() {
        let mut estimator = ProgressEstimator::new(RateMode::Windowed);
        assert_eq!(estimator.throughput_bytes_per_second(), None);
        estimator.on_bytes_delivered(100);
        assert_eq!(estimator.throughput_bytes_per_second(), None);
    }

    #[test]
    fn windowed_rate_from_two_spaced_samples() {
        let mut estimator = ProgressEstimator::new(RateMode::Windowed);
        estimator.on_bytes_delivered(100);
        std::thread::sleep(Duration::from_millis(20));
        estimator.on_bytes_delivered(100);

        let rate = estimator.throughput_bytes_per_second().unwrap();
        assert!(rate > 0.0);
        assert!(rate.is_finite());
    }

    #[test]
    fn eta_requires_positive_rate() {
        let mut estimator = ProgressEstimator::new(RateMode::Windowed);
        estimator.on_bytes_delivered(0);
        std::thread::sleep(Duration::from_millis(5));
        estimator.on_bytes_delivered(0);

        // Two samples with no bytes between them: rate 0.0, no ETA.
        assert_eq!(estimator.throughput_bytes_per_second(), Some(0.0));
        assert_eq!(estimator.eta_seconds(Some(1000)), None);
    }

    #[test]
    fn eta_counts_remaining_bytes() {
        let mut estimator = ProgressEstimator::new(RateMode::SessionAverage);
        estimator.on_bytes_delivered(400);

        let rate = estimator.throughput_bytes_per_second().unwrap();
        let eta = estimator.eta_seconds(Some(1000)).unwrap();
        assert!((eta - 600.0 / rate).abs() < 1e-9);
        assert!(eta.is_finite());
    }

    #[test]
    fn sample_count_is_capped() {
        let mut estimator = ProgressEstimator::new(RateMode::Windowed);
        for _ in 0..(MAX_PROGRESS_SAMPLES + 50) {
            estimator.on_bytes_delivered(1);
        }
        assert!(estimator.samples.len() <= MAX_PROGRESS_SAMPLES);
        assert_eq!(estimator.cumulative_bytes(), (MAX_PROGRESS_SAMPLES + 50) as u64);
    }
}
