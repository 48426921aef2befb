use std::time::Duration;
use tokio::time::Instant;

/// Tracks running time since the last successful detection.
///
/// Paused spans are excluded: [`pause`](Self::pause) marks the start of a
/// pause and [`resume`](Self::resume) shifts the clock forward by its length,
/// so resuming after a long pause does not expire the watchdog immediately.
#[derive(Debug, Clone)]
pub struct IdleWatchdog {
    timeout: Option<Duration>,
    last_detection: Instant,
    paused_at: Option<Instant>,
}

impl IdleWatchdog {
    /// Start the idle clock now. `None` disables expiry.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self::starting_at(timeout, Instant::now())
    }

    pub fn starting_at(timeout: Option<Duration>, start: Instant) -> Self {
        Self {
            timeout,
            last_detection: start,
            paused_at: None,
        }
    }

    pub fn record_detection(&mut self, now: Instant) {
        self.last_detection = now;
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.last_detection += now.saturating_duration_since(paused_at);
        }
    }

    /// Running time without a detection, as of `now`
    pub fn idle_for(&self, now: Instant) -> Duration {
        let until = self.paused_at.unwrap_or(now);
        until.saturating_duration_since(self.last_detection)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        match self.timeout {
            Some(timeout) => self.paused_at.is_none() && self.idle_for(now) >= timeout,
            None => false,
        }
    }
}
