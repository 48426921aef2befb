use crate::models::{AgentConfig, ClickButton, Point};
use crate::platform::{InputDriver, InputError};
use std::time::Duration;
use thiserror::Error;

/// Why a click attempt was abandoned
#[derive(Error, Debug)]
pub enum ClickError {
    #[error("could not read pointer position before clicking: {0}")]
    Snapshot(#[source] InputError),

    #[error("click at {target} failed: {source}")]
    Click {
        target: Point,
        #[source]
        source: InputError,
    },

    #[error("pointer restore to {snapshot} failed: {source}")]
    Restore {
        snapshot: Point,
        #[source]
        source: InputError,
    },
}

/// Timing and button settings for one click sequence
#[derive(Debug, Clone, PartialEq)]
pub struct ClickSettings {
    pub button: ClickButton,
    pub count: u32,
    pub pre_click_delay: Duration,
    pub after_click_wait: Duration,
    pub restore_pointer: bool,
    pub restore_duration: Duration,
}

impl From<&AgentConfig> for ClickSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            button: config.click_button,
            count: config.click_count.max(1),
            pre_click_delay: config.pre_click_delay(),
            after_click_wait: config.after_click_wait(),
            restore_pointer: config.restore_pointer,
            restore_duration: config.restore_duration(),
        }
    }
}

/// What a completed sequence did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickReport {
    pub target: Point,
    /// Position the pointer was returned to, when restore is enabled
    pub restored_to: Option<Point>,
}

/// Runs save-pointer → pre-delay → click → post-click wait → restore-pointer.
///
/// A failed click aborts the remaining steps but the pointer is still
/// returned to its snapshot. Only a failed snapshot skips the restore.
#[derive(Debug, Clone)]
pub struct ClickExecutor {
    settings: ClickSettings,
}

impl ClickExecutor {
    pub fn new(settings: ClickSettings) -> Self {
        Self { settings }
    }

    pub async fn execute(
        &self,
        driver: &mut dyn InputDriver,
        target: Point,
    ) -> Result<ClickReport, ClickError> {
        let s = &self.settings;

        let snapshot = if s.restore_pointer {
            Some(driver.pointer().map_err(ClickError::Snapshot)?)
        } else {
            None
        };

        if !s.pre_click_delay.is_zero() {
            tokio::time::sleep(s.pre_click_delay).await;
        }

        tracing::debug!(
            "Clicking {}x with '{}' at {}",
            s.count,
            s.button.as_str(),
            target
        );
        let clicked = driver.click(target, s.button, s.count);

        if clicked.is_ok() && !s.after_click_wait.is_zero() {
            tokio::time::sleep(s.after_click_wait).await;
        }

        let restored = match snapshot {
            Some(snapshot) => Some(
                driver
                    .move_to(snapshot, s.restore_duration)
                    .map(|_| snapshot)
                    .map_err(|source| ClickError::Restore { snapshot, source }),
            ),
            None => None,
        };

        if let Err(source) = clicked {
            if let Some(Err(restore_err)) = restored {
                tracing::warn!("{}", restore_err);
            }
            return Err(ClickError::Click { target, source });
        }

        Ok(ClickReport {
            target,
            restored_to: restored.transpose()?,
        })
    }
}
