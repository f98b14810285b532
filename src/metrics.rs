// src/metrics.rs
//
// Detection loop observability. Tracks tick outcomes, detection counts,
// and loop timing. Export via summary() for logs or a status endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct DetectionMetrics {
    pub ticks_total: Arc<AtomicU64>,
    pub ticks_skipped: Arc<AtomicU64>,
    pub ticks_failed: Arc<AtomicU64>,
    pub objects_detected: Arc<AtomicU64>,
    pub threats_detected: Arc<AtomicU64>,
    pub alerts_raised: Arc<AtomicU64>,
    pub remote_successes: Arc<AtomicU64>,
    pub remote_failures: Arc<AtomicU64>,
    pub tick_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl DetectionMetrics {
    pub fn new() -> Self {
        Self {
            ticks_total: Arc::new(AtomicU64::new(0)),
            ticks_skipped: Arc::new(AtomicU64::new(0)),
            ticks_failed: Arc::new(AtomicU64::new(0)),
            objects_detected: Arc::new(AtomicU64::new(0)),
            threats_detected: Arc::new(AtomicU64::new(0)),
            alerts_raised: Arc::new(AtomicU64::new(0)),
            remote_successes: Arc::new(AtomicU64::new(0)),
            remote_failures: Arc::new(AtomicU64::new(0)),
            tick_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn set_timing(&self, counter: &AtomicU64, duration_us: u64) {
        counter.store(duration_us, Ordering::Relaxed);
    }

    /// Published ticks per second since the metrics were created.
    pub fn tick_rate(&self) -> f64 {
        let ticks = self.ticks_total.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            ticks as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            ticks_failed: self.ticks_failed.load(Ordering::Relaxed),
            objects_detected: self.objects_detected.load(Ordering::Relaxed),
            threats_detected: self.threats_detected.load(Ordering::Relaxed),
            alerts_raised: self.alerts_raised.load(Ordering::Relaxed),
            remote_successes: self.remote_successes.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            tick_rate: self.tick_rate(),
            last_tick_us: self.tick_time_us.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for DetectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub ticks_total: u64,
    pub ticks_skipped: u64,
    pub ticks_failed: u64,
    pub objects_detected: u64,
    pub threats_detected: u64,
    pub alerts_raised: u64,
    pub remote_successes: u64,
    pub remote_failures: u64,
    pub tick_rate: f64,
    pub last_tick_us: u64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = DetectionMetrics::new();
        metrics.inc(&metrics.ticks_total);
        metrics.inc(&metrics.ticks_total);
        metrics.add(&metrics.objects_detected, 3);
        metrics.set_timing(&metrics.tick_time_us, 1500);

        let summary = metrics.summary();
        assert_eq!(summary.ticks_total, 2);
        assert_eq!(summary.objects_detected, 3);
        assert_eq!(summary.last_tick_us, 1500);
        assert_eq!(summary.ticks_failed, 0);
    }

    #[test]
    fn clones_share_counters() {
        let metrics = DetectionMetrics::new();
        let clone = metrics.clone();
        clone.inc(&clone.ticks_failed);
        assert_eq!(metrics.summary().ticks_failed, 1);
    }
}
