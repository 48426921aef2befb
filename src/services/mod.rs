//! Services module - the agent's behaviour, independent of any desktop backend.
//!
//! Everything here talks to the screen, the pointer and the window manager only
//! through the traits in [`crate::platform`], so it runs unchanged against
//! scripted fakes in tests.
//!
//! # Components
//!
//! - [`DetectionLoop`]: fixed-cadence poll loop. Each tick drains hotkey events,
//!   applies the window-title filter, captures once, matches every template and
//!   clicks the best hit that reaches the confidence threshold.
//! - [`ClickExecutor`]: the save-pointer / delay / click / wait / restore sequence.
//! - [`IdleWatchdog`]: stops the agent after a period with no detections
//!   (paused time does not count).
//! - [`WindowFilter`]: case-insensitive substring match on the focused window title.
//! - [`TemplateSet`] and [`load_templates`]: decode the primary template plus an
//!   optional directory of extra button images.
//! - [`ErrorThrottle`]: keeps repeated per-tick errors from flooding the log.
//!
//! # Usage Example
//!
//! ```ignore
//! use autoclick::services::{Collaborators, DetectionLoop, load_templates};
//!
//! let templates = load_templates(&config.image_path, config.images_dir.as_deref())?;
//! let detection = DetectionLoop::new(&config, state, templates, parts, events, metrics);
//! let reason = detection.run().await;
//! ```

pub mod click;
pub mod detection;
pub mod templates;
pub mod throttle;
pub mod watchdog;
pub mod window_filter;

pub use click::{ClickError, ClickExecutor, ClickReport, ClickSettings};
pub use detection::{
    Collaborators, Detection, DetectionLoop, LoopSettings, TickError, TickOutcome,
};
pub use templates::{TemplateError, TemplateSet, load_template, load_templates};
pub use throttle::{DEFAULT_ERROR_WINDOW, ErrorThrottle};
pub use watchdog::IdleWatchdog;
pub use window_filter::WindowFilter;
