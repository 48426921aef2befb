use crate::metrics::Metrics;
use crate::models::{AgentConfig, HotkeyEvent, Point, Region, RunState, StopReason, Trigger};
use crate::platform::{
    CaptureError, FrameSource, InputDriver, MatchError, Matcher, WindowError, WindowInspector,
};
use crate::services::click::{ClickExecutor, ClickSettings};
use crate::services::templates::TemplateSet;
use crate::services::throttle::{DEFAULT_ERROR_WINDOW, ErrorThrottle};
use crate::services::watchdog::IdleWatchdog;
use crate::services::window_filter::WindowFilter;
use crate::state::{StateChange, StateManager};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Per-tick I/O failures. They are logged and the tick counts as a miss.
#[derive(Error, Debug)]
pub enum TickError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("matching '{template}' failed: {source}")]
    Match {
        template: String,
        #[source]
        source: MatchError,
    },

    #[error("active window lookup failed: {0}")]
    Window(#[from] WindowError),
}

/// The external collaborators a loop drives
pub struct Collaborators {
    pub frames: Box<dyn FrameSource>,
    pub matcher: Box<dyn Matcher>,
    pub input: Box<dyn InputDriver>,
    pub windows: Box<dyn WindowInspector>,
}

/// A threshold-passing detection chosen for this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub template: String,
    pub location: Point,
    pub confidence: f64,
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing was captured
    Inactive(RunState),

    /// Focused window did not pass the title filter; nothing was captured
    WindowSkipped,

    /// Detection found and the click sequence ran (`clicked` is false when it was aborted)
    Hit { detection: Detection, clicked: bool },

    /// No template reached the threshold, or the tick hit an I/O error
    NoMatch,

    /// The idle watchdog expired on this tick and stopped the agent
    IdleExpired,
}

/// Loop parameters taken from the configuration
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub interval: Duration,
    pub confidence: f64,
    pub region: Option<Region>,
    pub idle_timeout: Option<Duration>,
    pub debug: bool,
}

impl From<&AgentConfig> for LoopSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            interval: config.interval(),
            confidence: config.confidence,
            region: config.region,
            idle_timeout: config.idle_timeout(),
            debug: config.debug,
        }
    }
}

/// Fixed-cadence poll loop: sleep, tick, repeat until stopped.
///
/// Hotkey events arrive on a channel; the loop applies them through the
/// [`StateManager`] at the start of each tick and while sleeping, so a quit is
/// honoured before the next sleep completes. A tick (including any click
/// sequence) always finishes before the next sleep starts.
pub struct DetectionLoop {
    settings: LoopSettings,
    state: StateManager,
    templates: TemplateSet,
    parts: Collaborators,
    filter: WindowFilter,
    clicker: ClickExecutor,
    watchdog: IdleWatchdog,
    throttle: ErrorThrottle,
    metrics: Arc<Metrics>,
    events: mpsc::UnboundedReceiver<HotkeyEvent>,
    events_closed: bool,
}

impl DetectionLoop {
    pub fn new(
        config: &AgentConfig,
        state: StateManager,
        templates: TemplateSet,
        parts: Collaborators,
        events: mpsc::UnboundedReceiver<HotkeyEvent>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let settings = LoopSettings::from(config);
        Self {
            filter: WindowFilter::new(config.window_title_filter.as_deref()),
            clicker: ClickExecutor::new(ClickSettings::from(config)),
            watchdog: IdleWatchdog::new(settings.idle_timeout),
            throttle: ErrorThrottle::new(DEFAULT_ERROR_WINDOW, settings.debug),
            settings,
            state,
            templates,
            parts,
            metrics,
            events,
            events_closed: false,
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Running time since the last detection
    pub fn idle_for(&self) -> Duration {
        self.watchdog.idle_for(Instant::now())
    }

    /// Run until the agent stops; returns why it stopped.
    pub async fn run(mut self) -> StopReason {
        tracing::info!(
            "Detection loop started: {} template(s), interval {:?}, confidence {:.2}",
            self.templates.len(),
            self.settings.interval,
            self.settings.confidence
        );

        loop {
            if self.sleep_observing_hotkeys().await {
                break;
            }
            if let TickOutcome::Inactive(RunState::Stopped) | TickOutcome::IdleExpired =
                self.tick().await
            {
                break;
            }
        }

        let reason = self.state.stop_reason().unwrap_or(StopReason::QuitHotkey);
        tracing::info!("Detection loop exited: {}", reason);
        reason
    }

    /// Execute one tick.
    pub async fn tick(&mut self) -> TickOutcome {
        self.metrics.record_tick();
        self.drain_hotkeys();

        let run_state = self.state.run_state();
        if !run_state.is_running() {
            return TickOutcome::Inactive(run_state);
        }

        match self.filter.allows(self.parts.windows.as_mut()) {
            Ok(true) => {}
            Ok(false) => {
                self.metrics.record_skipped_tick();
                tracing::trace!("Focused window does not match filter, skipping tick");
                return self.after_miss(TickOutcome::WindowSkipped);
            }
            Err(e) => {
                self.report_transient(&TickError::from(e));
                return self.after_miss(TickOutcome::NoMatch);
            }
        }

        let detection = match self.detect() {
            Ok(Some(detection)) => detection,
            Ok(None) => return self.after_miss(TickOutcome::NoMatch),
            Err(e) => {
                self.report_transient(&e);
                return self.after_miss(TickOutcome::NoMatch);
            }
        };

        self.metrics.record_hit();
        self.watchdog.record_detection(Instant::now());
        tracing::info!(
            "Match: {} @ {} score={:.3}",
            detection.template,
            detection.location,
            detection.confidence
        );

        let clicked = match self
            .clicker
            .execute(self.parts.input.as_mut(), detection.location)
            .await
        {
            Ok(_) => {
                self.metrics.record_click();
                true
            }
            Err(e) => {
                self.metrics.record_click_failure();
                tracing::warn!("Click attempt aborted: {}", e);
                false
            }
        };

        TickOutcome::Hit { detection, clicked }
    }

    /// Capture once and return the best threshold-passing hit across all
    /// templates. Ties keep the earlier template.
    fn detect(&mut self) -> Result<Option<Detection>, TickError> {
        let frame = self.parts.frames.capture(self.settings.region)?;
        let threshold = self.settings.confidence;

        let mut best: Option<Detection> = None;
        for template in self.templates.iter() {
            let result = self
                .parts
                .matcher
                .find(&frame, template, threshold)
                .map_err(|source| TickError::Match {
                    template: template.name.clone(),
                    source,
                })?;

            if let Some((location, confidence)) = result.passing(threshold) {
                if best.as_ref().is_none_or(|b| confidence > b.confidence) {
                    best = Some(Detection {
                        template: template.name.clone(),
                        location,
                        confidence,
                    });
                }
            }
        }

        Ok(best)
    }

    fn after_miss(&mut self, outcome: TickOutcome) -> TickOutcome {
        if !self.watchdog.is_expired(Instant::now()) {
            return outcome;
        }

        tracing::info!(
            "No detections for {:.0}s, stopping",
            self.watchdog.idle_for(Instant::now()).as_secs_f64()
        );
        self.apply(Trigger::IdleTimeout);
        TickOutcome::IdleExpired
    }

    fn report_transient(&mut self, error: &TickError) {
        self.metrics.record_transient_error();
        if self.throttle.should_warn(Instant::now()) {
            tracing::warn!("Tick error: {}", error);
        } else {
            tracing::debug!("Tick error: {}", error);
        }
    }

    fn apply(&mut self, trigger: Trigger) -> Option<StateChange> {
        let change = self.state.apply(trigger);
        match change {
            Some(StateChange::Paused) => self.watchdog.pause(Instant::now()),
            Some(StateChange::Resumed) => self.watchdog.resume(Instant::now()),
            _ => {}
        }
        change
    }

    fn drain_hotkeys(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply(Trigger::Hotkey(event));
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.mark_hotkeys_closed();
                    break;
                }
            }
        }
    }

    /// Sleep one interval, applying hotkey events as they arrive.
    /// Returns true once the agent has stopped.
    async fn sleep_observing_hotkeys(&mut self) -> bool {
        let deadline = Instant::now() + self.settings.interval;

        loop {
            if self.state.run_state().is_stopped() {
                return true;
            }

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => return false,
                event = self.events.recv(), if !self.events_closed => match event {
                    Some(event) => {
                        self.apply(Trigger::Hotkey(event));
                    }
                    None => self.mark_hotkeys_closed(),
                },
            }
        }
    }

    fn mark_hotkeys_closed(&mut self) {
        if !self.events_closed {
            self.events_closed = true;
            tracing::warn!("Hotkey listener disconnected; toggle and quit hotkeys are unavailable");
        }
    }
}
