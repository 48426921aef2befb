// State management module
//
// This module provides the StateManager, the single authority for the agent's
// run state. It wraps AgentState in Arc<RwLock<T>> and emits change events.

use crate::models::{HotkeyEvent, RunState, StopReason, Trigger};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when the run state moves
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Scanning suspended by the toggle hotkey
    Paused,

    /// Scanning resumed by the toggle hotkey
    Resumed,

    /// Terminal transition; the loop and process exit
    Stopped { reason: StopReason },
}

/// Snapshot of the shared agent state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentState {
    pub run_state: RunState,
    pub stop_reason: Option<StopReason>,

    /// Number of transitions applied so far
    pub transitions: u64,
}

/// Thread-safe run state machine with event emission
///
/// Every transition funnels through [`apply()`](Self::apply), so readers always
/// observe a definite state:
/// - [`run_state()`](Self::run_state) / [`read()`](Self::read) for lock-scoped reads
/// - [`apply()`](Self::apply) for transitions, returning the emitted [`StateChange`]
/// - [`subscribe()`](Self::subscribe) for listening to transitions
///
/// Cloning shares the same underlying state.
pub struct StateManager {
    state: Arc<RwLock<AgentState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager in the `Running` state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 32 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(32);
        Self {
            state: Arc::new(RwLock::new(AgentState::default())),
            state_tx,
        }
    }

    /// Get a copy of the current state
    pub fn snapshot(&self) -> AgentState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let stopped = state_manager.read(|state| state.run_state.is_stopped());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AgentState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    pub fn run_state(&self) -> RunState {
        self.read(|s| s.run_state)
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.read(|s| s.stop_reason)
    }

    /// Apply a trigger to the state machine.
    ///
    /// The read-modify-write happens under one write lock. Returns the change
    /// that was emitted, or `None` when the trigger had no effect.
    pub fn apply(&self, trigger: Trigger) -> Option<StateChange> {
        let change = {
            let mut state = self.state.write().unwrap();
            let old = state.run_state;
            let new = old.next(trigger);
            if old == new {
                return None;
            }

            state.run_state = new;
            state.transitions += 1;

            match new {
                RunState::Paused => StateChange::Paused,
                RunState::Running => StateChange::Resumed,
                RunState::Stopped => {
                    let reason = trigger.stop_reason();
                    state.stop_reason = Some(reason);
                    StateChange::Stopped { reason }
                }
            }
        };

        match &change {
            StateChange::Paused => tracing::info!("Autoclick paused"),
            StateChange::Resumed => tracing::info!("Autoclick resumed"),
            StateChange::Stopped { reason } => tracing::info!("Autoclick stopping: {}", reason),
        }

        // Ignore send errors - it's OK if no one is listening
        let _ = self.state_tx.send(change.clone());
        Some(change)
    }

    /// Convenience wrapper for hotkey deliveries
    pub fn handle_hotkey(&self, event: HotkeyEvent) -> Option<StateChange> {
        self.apply(Trigger::Hotkey(event))
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver that will get notified of all future transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
