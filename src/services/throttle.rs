use std::time::Duration;
use tokio::time::Instant;

/// Minimum gap between warn-level reports of per-tick errors
pub const DEFAULT_ERROR_WINDOW: Duration = Duration::from_secs(5);

/// Rate limiter for repeated per-tick warnings.
///
/// Errors inside the window are still logged, only at debug level.
#[derive(Debug, Clone)]
pub struct ErrorThrottle {
    window: Duration,
    verbose: bool,
    last_warned: Option<Instant>,
}

impl ErrorThrottle {
    /// `verbose` disables throttling (every error warns).
    pub fn new(window: Duration, verbose: bool) -> Self {
        Self {
            window,
            verbose,
            last_warned: None,
        }
    }

    /// Whether an error seen at `now` should be logged at warn level.
    pub fn should_warn(&mut self, now: Instant) -> bool {
        let due = self.verbose
            || self
                .last_warned
                .is_none_or(|last| now.saturating_duration_since(last) > self.window);
        if due {
            self.last_warned = Some(now);
        }
        due
    }
}

impl Default for ErrorThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_WINDOW, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttles_within_window() {
        let start = Instant::now();
        let mut throttle = ErrorThrottle::default();

        assert!(throttle.should_warn(start));
        assert!(!throttle.should_warn(start + Duration::from_secs(1)));
        assert!(!throttle.should_warn(start + Duration::from_secs(5)));
        assert!(throttle.should_warn(start + Duration::from_millis(5001)));
    }

    #[test]
    fn test_verbose_always_warns() {
        let start = Instant::now();
        let mut throttle = ErrorThrottle::new(DEFAULT_ERROR_WINDOW, true);

        assert!(throttle.should_warn(start));
        assert!(throttle.should_warn(start));
    }
}
