// Autoclick - screen-watching agent that clicks a known button whenever it appears
//
// This is the library crate containing the detection loop, its collaborators and data structures.
// The binary crate (main.rs) wires them to the desktop and runs the loop.

pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod platform;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{ConfigManager, Overrides};
pub use metrics::Metrics;
pub use models::{AgentConfig, HotkeyEvent, RunState, StopReason};
pub use services::{Collaborators, DetectionLoop, TickOutcome};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
