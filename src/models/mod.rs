//! Data models for the autoclick agent.
//!
//! - [`AgentConfig`]: immutable run parameters resolved at startup (thresholds, timings, filters, hotkeys)
//! - [`RunState`]: `Running` / `Paused` / `Stopped` and the [`Trigger`]s that move between them
//! - [`HotkeySpec`]: parsed global hotkey chords such as `ctrl+alt+a`
//! - [`Frame`], [`Template`], [`MatchResult`]: what flows through a detection tick
//!
//! Nothing in here performs I/O; the services and platform layers do.

pub mod config;
pub mod detection;
pub mod hotkey;
pub mod run_state;

pub use config::{AgentConfig, ClickButton, ConfigError, MAX_DURATION_SECONDS, Region};
pub use detection::{Frame, MatchResult, Point, Template};
pub use hotkey::{HotkeyKey, HotkeyParseError, HotkeySpec, Modifiers};
pub use run_state::{HotkeyEvent, RunState, StopReason, Trigger};
