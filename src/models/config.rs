use crate::models::hotkey::{HotkeyParseError, HotkeySpec};
use crate::models::run_state::HotkeyEvent;
use camino::Utf8PathBuf;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for every duration setting (one week)
pub const MAX_DURATION_SECONDS: f64 = 604_800.0;

static REGION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+)\s*,\s*(-?\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*$")
        .expect("Invalid region regex")
});

/// Rectangular screen area, in absolute screen pixels.
///
/// Deserializes either from a `{left, top, width, height}` map or from the
/// command-line form `"left,top,width,height"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegionRepr")]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegionRepr {
    Text(String),
    Fields {
        left: i32,
        top: i32,
        width: u32,
        height: u32,
    },
}

impl TryFrom<RegionRepr> for Region {
    type Error = ConfigError;

    fn try_from(repr: RegionRepr) -> Result<Self, Self::Error> {
        match repr {
            RegionRepr::Text(text) => Region::parse(&text),
            RegionRepr::Fields {
                left,
                top,
                width,
                height,
            } => Region::new(left, top, width, height),
        }
    }
}

impl Region {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidRegion(format!(
                "{},{},{},{}",
                left, top, width, height
            )));
        }
        Ok(Self {
            left,
            top,
            width,
            height,
        })
    }

    /// Parse `left,top,width,height` with positive width and height.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRegion(text.to_string());
        let caps = REGION_PATTERN.captures(text).ok_or_else(invalid)?;

        let left = caps[1].parse().map_err(|_| invalid())?;
        let top = caps[2].parse().map_err(|_| invalid())?;
        let width = caps[3].parse().map_err(|_| invalid())?;
        let height = caps[4].parse().map_err(|_| invalid())?;

        Region::new(left, top, width, height)
    }
}

/// Mouse button used for the click action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClickButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl ClickButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClickButton::Left => "left",
            ClickButton::Right => "right",
            ClickButton::Middle => "middle",
        }
    }
}

/// Validation failures for [`AgentConfig`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("confidence must be in (0, 1], got {0}")]
    InvalidConfidence(f64),

    #[error("interval must be greater than 0 and at most 604800 seconds, got {0}")]
    InvalidInterval(f64),

    #[error("{field} must be between 0 and 604800 seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("click count must be at least 1")]
    InvalidClickCount,

    #[error("invalid region '{0}': expected 'left,top,width,height' with positive width and height")]
    InvalidRegion(String),

    #[error("invalid {name} hotkey '{spec}': {source}")]
    InvalidHotkey {
        name: &'static str,
        spec: String,
        #[source]
        source: HotkeyParseError,
    },

    #[error("toggle and quit hotkeys are both '{0}'")]
    DuplicateHotkey(String),
}

/// Run parameters, resolved once at startup and never mutated afterwards.
///
/// Durations are stored as seconds (`f64`) to match the file and CLI surface;
/// use the accessor methods to get [`Duration`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Primary template image (required, must decode)
    pub image_path: Utf8PathBuf,

    /// Optional directory of extra templates scanned at startup
    pub images_dir: Option<Utf8PathBuf>,

    pub confidence: f64,
    pub interval_seconds: f64,
    pub pre_click_delay_seconds: f64,
    pub after_click_wait_seconds: f64,
    pub region: Option<Region>,

    /// Case-insensitive substring the focused window title must contain
    pub window_title_filter: Option<String>,

    pub click_count: u32,
    pub click_button: ClickButton,

    /// Stop after this much running time without a detection; 0 disables
    pub idle_timeout_seconds: f64,

    pub restore_pointer: bool,
    pub restore_duration_seconds: f64,
    pub toggle_hotkey: String,
    pub quit_hotkey: String,

    pub debug: bool,
    pub log_dir: Utf8PathBuf,
    pub log_json: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            image_path: Utf8PathBuf::from("approve.png"),
            images_dir: None,
            confidence: 0.85,
            interval_seconds: 0.2,
            pre_click_delay_seconds: 0.0,
            after_click_wait_seconds: 0.5,
            region: None,
            window_title_filter: None,
            click_count: 1,
            click_button: ClickButton::Left,
            idle_timeout_seconds: 600.0,
            restore_pointer: true,
            restore_duration_seconds: 0.0,
            toggle_hotkey: "ctrl+alt+a".to_string(),
            quit_hotkey: "ctrl+alt+q".to_string(),
            debug: false,
            log_dir: Utf8PathBuf::from("logs"),
            log_json: false,
        }
    }
}

impl AgentConfig {
    /// Check every invariant; the first violation is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.confidence > 0.0 && self.confidence <= 1.0) {
            return Err(ConfigError::InvalidConfidence(self.confidence));
        }
        if !(self.interval_seconds > 0.0 && self.interval_seconds <= MAX_DURATION_SECONDS) {
            return Err(ConfigError::InvalidInterval(self.interval_seconds));
        }

        for (field, value) in [
            ("pre_click_delay_seconds", self.pre_click_delay_seconds),
            ("after_click_wait_seconds", self.after_click_wait_seconds),
            ("idle_timeout_seconds", self.idle_timeout_seconds),
            ("restore_duration_seconds", self.restore_duration_seconds),
        ] {
            if !(0.0..=MAX_DURATION_SECONDS).contains(&value) {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }

        if self.click_count < 1 {
            return Err(ConfigError::InvalidClickCount);
        }

        if let Some(region) = self.region {
            Region::new(region.left, region.top, region.width, region.height)?;
        }

        let toggle = self.toggle_spec()?;
        let quit = self.quit_spec()?;
        if toggle == quit {
            return Err(ConfigError::DuplicateHotkey(toggle.to_string()));
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_seconds)
    }

    pub fn pre_click_delay(&self) -> Duration {
        Duration::from_secs_f64(self.pre_click_delay_seconds)
    }

    pub fn after_click_wait(&self) -> Duration {
        Duration::from_secs_f64(self.after_click_wait_seconds)
    }

    pub fn restore_duration(&self) -> Duration {
        Duration::from_secs_f64(self.restore_duration_seconds)
    }

    /// `None` when the idle watchdog is disabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_seconds > 0.0).then(|| Duration::from_secs_f64(self.idle_timeout_seconds))
    }

    pub fn toggle_spec(&self) -> Result<HotkeySpec, ConfigError> {
        parse_hotkey("toggle", &self.toggle_hotkey)
    }

    pub fn quit_spec(&self) -> Result<HotkeySpec, ConfigError> {
        parse_hotkey("quit", &self.quit_hotkey)
    }

    /// Hotkeys to register, paired with the event each one delivers
    pub fn hotkey_bindings(&self) -> Result<Vec<(HotkeySpec, HotkeyEvent)>, ConfigError> {
        Ok(vec![
            (self.toggle_spec()?, HotkeyEvent::Toggle),
            (self.quit_spec()?, HotkeyEvent::Quit),
        ])
    }
}

fn parse_hotkey(name: &'static str, spec: &str) -> Result<HotkeySpec, ConfigError> {
    spec.parse().map_err(|source| ConfigError::InvalidHotkey {
        name,
        spec: spec.to_string(),
        source,
    })
}
