//! Platform boundary: the collaborators the detection loop drives.
//!
//! Each external concern is a trait so the core loop can run against scripted
//! fakes in tests. The concrete desktop implementations live in the
//! submodules:
//!
//! - [`ScreenCapture`] / [`FocusedWindow`]: `xcap` screen grabs and focused-window lookup
//! - [`NccMatcher`]: normalised cross-correlation template search on `image` buffers
//! - [`EnigoDriver`]: pointer queries, moves and clicks through `enigo`
//! - [`RdevHotkeys`]: global keyboard hook through `rdev`

pub mod hotkeys;
pub mod input;
pub mod matcher;
pub mod screen;

pub use hotkeys::RdevHotkeys;
pub use input::EnigoDriver;
pub use matcher::NccMatcher;
pub use screen::{FocusedWindow, ScreenCapture};

use crate::models::{ClickButton, Frame, HotkeyEvent, HotkeySpec, MatchResult, Point, Region, Template};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no display available to capture")]
    NoDisplay,

    #[error("region {region:?} lies outside the captured screen ({width}x{height})")]
    RegionOutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },

    #[error("screen capture failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("template '{0}' has no pixels")]
    EmptyTemplate(String),

    #[error("frame has no pixels")]
    EmptyFrame,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input backend unavailable: {0}")]
    Unavailable(String),

    #[error("pointer query failed: {0}")]
    Pointer(String),

    #[error("pointer move failed: {0}")]
    Move(String),

    #[error("{button} click failed: {reason}")]
    Click { button: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window query failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("hotkey '{0}' cannot be bound on this platform")]
    UnsupportedKey(String),

    #[error("failed to start hotkey listener thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("global keyboard hook failed: {0}")]
    ListenFailed(String),
}

/// Supplies bitmaps of the screen on request.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSource {
    /// Capture the full screen, or only `region` when given.
    fn capture(&mut self, region: Option<Region>) -> Result<Frame, CaptureError>;
}

/// Scores template similarity within a frame.
#[cfg_attr(test, mockall::automock)]
pub trait Matcher {
    /// Best match of `template` in `frame`; `NoMatch` when nothing reaches `threshold`.
    fn find(&self, frame: &Frame, template: &Template, threshold: f64) -> Result<MatchResult, MatchError>;
}

/// Pointer primitives.
#[cfg_attr(test, mockall::automock)]
pub trait InputDriver {
    fn pointer(&mut self) -> Result<Point, InputError>;

    /// Move to `target`, animated over `duration` (zero moves instantly).
    fn move_to(&mut self, target: Point, duration: Duration) -> Result<(), InputError>;

    fn click(&mut self, target: Point, button: ClickButton, count: u32) -> Result<(), InputError>;
}

/// Reports the title of the focused window, if any.
#[cfg_attr(test, mockall::automock)]
pub trait WindowInspector {
    fn active_title(&mut self) -> Result<Option<String>, WindowError>;
}

/// Registers global hotkeys and delivers their presses as events.
pub trait HotkeySource {
    /// Bind every chord; failure to bind any of them is fatal for the caller.
    fn subscribe(
        &mut self,
        bindings: &[(HotkeySpec, HotkeyEvent)],
    ) -> Result<mpsc::UnboundedReceiver<HotkeyEvent>, RegistrationError>;
}
