use std::fmt;

/// Lifecycle of the agent. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    #[default]
    Running,
    Paused,
    Stopped,
}

/// Events delivered by the global hotkey listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyEvent {
    Toggle,
    Quit,
}

/// Anything that may move the run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Hotkey(HotkeyEvent),
    IdleTimeout,
}

/// Why the agent reached `Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitHotkey,
    IdleTimeout,
}

impl RunState {
    /// Pure transition table.
    ///
    /// - Toggle flips `Running`/`Paused` and is ignored once stopped.
    /// - Quit stops from any state.
    /// - Idle expiry only stops a running agent.
    pub fn next(self, trigger: Trigger) -> RunState {
        match (self, trigger) {
            (RunState::Stopped, _) => RunState::Stopped,
            (_, Trigger::Hotkey(HotkeyEvent::Quit)) => RunState::Stopped,
            (RunState::Running, Trigger::Hotkey(HotkeyEvent::Toggle)) => RunState::Paused,
            (RunState::Paused, Trigger::Hotkey(HotkeyEvent::Toggle)) => RunState::Running,
            (RunState::Running, Trigger::IdleTimeout) => RunState::Stopped,
            (RunState::Paused, Trigger::IdleTimeout) => RunState::Paused,
        }
    }

    pub fn is_running(self) -> bool {
        self == RunState::Running
    }

    pub fn is_stopped(self) -> bool {
        self == RunState::Stopped
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
        })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::QuitHotkey => "quit hotkey pressed",
            StopReason::IdleTimeout => "no detections within idle timeout",
        })
    }
}

impl Trigger {
    /// Stop reason recorded when this trigger ends the run
    pub fn stop_reason(self) -> StopReason {
        match self {
            Trigger::IdleTimeout => StopReason::IdleTimeout,
            Trigger::Hotkey(_) => StopReason::QuitHotkey,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOGGLE: Trigger = Trigger::Hotkey(HotkeyEvent::Toggle);
    const QUIT: Trigger = Trigger::Hotkey(HotkeyEvent::Quit);

    #[test]
    fn test_toggle_flips() {
        assert_eq!(RunState::Running.next(TOGGLE), RunState::Paused);
        assert_eq!(RunState::Paused.next(TOGGLE), RunState::Running);
        assert_eq!(RunState::Stopped.next(TOGGLE), RunState::Stopped);
    }

    #[test]
    fn test_quit_from_any_state() {
        for state in [RunState::Running, RunState::Paused, RunState::Stopped] {
            assert_eq!(state.next(QUIT), RunState::Stopped);
        }
    }

    #[test]
    fn test_idle_timeout_exempts_paused() {
        assert_eq!(RunState::Running.next(Trigger::IdleTimeout), RunState::Stopped);
        assert_eq!(RunState::Paused.next(Trigger::IdleTimeout), RunState::Paused);
    }

    #[test]
    fn test_default_is_running() {
        assert!(RunState::default().is_running());
    }
}
