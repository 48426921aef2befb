// Run metrics module
//
// Provides lightweight counters for what the detection loop did during a run

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Run-wide counters
///
/// Uses atomic operations for thread-safe tracking without locks.
/// Logged once on shutdown as a run summary.
#[derive(Debug)]
pub struct Metrics {
    /// Ticks executed (including inactive ones)
    pub ticks: AtomicU64,

    /// Running ticks skipped by the window filter
    pub skipped_ticks: AtomicU64,

    /// Threshold-passing detections
    pub hits: AtomicU64,

    /// Click sequences that completed
    pub clicks: AtomicU64,

    /// Click sequences that were aborted
    pub click_failures: AtomicU64,

    /// Capture, match and window-query errors
    pub transient_errors: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            skipped_ticks: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            clicks: AtomicU64::new(0),
            click_failures: AtomicU64::new(0),
            transient_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_tick(&self) {
        self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_click(&self) {
        self.clicks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_click_failure(&self) {
        self.click_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transient_error(&self) {
        self.transient_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Fraction of hits whose click sequence completed
    pub fn click_success_rate(&self) -> f64 {
        let clicks = self.clicks.load(Ordering::Relaxed);
        let attempts = clicks + self.click_failures.load(Ordering::Relaxed);
        if attempts > 0 {
            clicks as f64 / attempts as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Run Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Ticks: {} ({} skipped by window filter)",
            self.ticks.load(Ordering::Relaxed),
            self.skipped_ticks.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Detections: {}, clicks: {}, failed clicks: {} ({:.0}% success)",
            self.hits.load(Ordering::Relaxed),
            self.clicks.load(Ordering::Relaxed),
            self.click_failures.load(Ordering::Relaxed),
            self.click_success_rate() * 100.0
        );
        tracing::info!(
            "Transient errors: {}",
            self.transient_errors.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
