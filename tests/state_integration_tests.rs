//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits change events for every effective transition
//! - Supports multiple subscribers
//! - Keeps transitions consistent under concurrent hotkey deliveries
//! - Treats Stopped as terminal

use autoclick::models::Trigger;
use autoclick::{HotkeyEvent, RunState, StateChange, StateManager, StopReason};
use proptest::prelude::*;
use std::sync::Arc;
use tokio::time::{Duration, timeout};

#[tokio::test]
async fn test_toggle_events_emitted() {
    let state = StateManager::new();
    let mut rx = state.subscribe();

    state.handle_hotkey(HotkeyEvent::Toggle);
    state.handle_hotkey(HotkeyEvent::Toggle);

    let first = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");
    let second = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert_eq!(first, StateChange::Paused);
    assert_eq!(second, StateChange::Resumed);
    assert_eq!(state.run_state(), RunState::Running);
}

#[tokio::test]
async fn test_multiple_subscribers_receive_stop() {
    let state = StateManager::new();
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();

    state.apply(Trigger::IdleTimeout);

    for rx in [&mut rx1, &mut rx2] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Channel closed");
        assert_eq!(
            event,
            StateChange::Stopped {
                reason: StopReason::IdleTimeout
            }
        );
    }
}

#[tokio::test]
async fn test_stopped_is_terminal() {
    let state = StateManager::new();
    let mut rx = state.subscribe();

    assert!(state.handle_hotkey(HotkeyEvent::Quit).is_some());
    assert_eq!(state.handle_hotkey(HotkeyEvent::Toggle), None);
    assert_eq!(state.handle_hotkey(HotkeyEvent::Quit), None);
    assert_eq!(state.apply(Trigger::IdleTimeout), None);

    assert_eq!(state.run_state(), RunState::Stopped);
    assert_eq!(state.stop_reason(), Some(StopReason::QuitHotkey));

    // Only the first transition was broadcast
    rx.recv().await.unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_idle_timeout_ignored_while_paused() {
    let state = StateManager::new();
    state.handle_hotkey(HotkeyEvent::Toggle);

    assert_eq!(state.apply(Trigger::IdleTimeout), None);
    assert_eq!(state.run_state(), RunState::Paused);

    // Quit still works from Paused
    assert_eq!(
        state.handle_hotkey(HotkeyEvent::Quit),
        Some(StateChange::Stopped {
            reason: StopReason::QuitHotkey
        })
    );
}

#[tokio::test]
async fn test_concurrent_toggles_are_serialized() {
    let state = Arc::new(StateManager::new());
    let mut handles = vec![];

    for _ in 0..10 {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move {
            for _ in 0..10 {
                state.handle_hotkey(HotkeyEvent::Toggle);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // 100 toggles: every one applied, even count ends where it started
    let snapshot = state.snapshot();
    assert_eq!(snapshot.transitions, 100);
    assert_eq!(snapshot.run_state, RunState::Running);
}

#[tokio::test]
async fn test_clones_share_state() {
    let state = StateManager::new();
    let other = state.clone();

    other.handle_hotkey(HotkeyEvent::Toggle);
    assert_eq!(state.run_state(), RunState::Paused);
}

proptest! {
    #[test]
    fn prop_toggle_parity(toggles in 0usize..64) {
        let state = StateManager::new();
        for _ in 0..toggles {
            state.handle_hotkey(HotkeyEvent::Toggle);
        }
        let expected = if toggles % 2 == 0 { RunState::Running } else { RunState::Paused };
        prop_assert_eq!(state.run_state(), expected);
    }

    #[test]
    fn prop_quit_always_stops(events in proptest::collection::vec(any::<bool>(), 0..32)) {
        let state = StateManager::new();
        for toggle in events {
            let event = if toggle { HotkeyEvent::Toggle } else { HotkeyEvent::Quit };
            state.handle_hotkey(event);
            if !toggle {
                prop_assert_eq!(state.run_state(), RunState::Stopped);
            }
        }
        if state.run_state() == RunState::Stopped {
            prop_assert_eq!(state.stop_reason(), Some(StopReason::QuitHotkey));
        }
    }
}
