use super::{HotkeySource, RegistrationError};
use crate::models::{HotkeyEvent, HotkeyKey, HotkeySpec, Modifiers};
use rdev::{EventType, Key};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long to wait for the keyboard hook to fail before assuming it is live
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(250);

/// Global hotkeys through an `rdev` keyboard hook on a dedicated thread.
///
/// `rdev::listen` blocks forever on success and returns only on failure, so
/// registration waits a short grace period for an error before handing the
/// receiver back.
#[derive(Debug, Clone)]
pub struct RdevHotkeys {
    grace: Duration,
}

impl RdevHotkeys {
    pub fn new() -> Self {
        Self::with_grace_period(DEFAULT_GRACE_PERIOD)
    }

    pub fn with_grace_period(grace: Duration) -> Self {
        Self { grace }
    }
}

impl Default for RdevHotkeys {
    fn default() -> Self {
        Self::new()
    }
}

impl HotkeySource for RdevHotkeys {
    fn subscribe(
        &mut self,
        bindings: &[(HotkeySpec, HotkeyEvent)],
    ) -> Result<mpsc::UnboundedReceiver<HotkeyEvent>, RegistrationError> {
        let mut tracker = ChordTracker::new(bindings)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (failed_tx, failed_rx) = std_mpsc::channel();

        thread::Builder::new()
            .name("autoclick-hotkeys".to_string())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    if let Some(hit) = tracker.observe(&event.event_type) {
                        tracing::debug!("Hotkey pressed: {:?}", hit);
                        let _ = tx.send(hit);
                    }
                });
                let reason = match result {
                    Ok(()) => "keyboard hook exited".to_string(),
                    Err(e) => format!("{:?}", e),
                };
                tracing::error!("Hotkey listener stopped: {}", reason);
                let _ = failed_tx.send(reason);
            })?;

        match failed_rx.recv_timeout(self.grace) {
            Ok(reason) => Err(RegistrationError::ListenFailed(reason)),
            Err(RecvTimeoutError::Timeout) => {
                for (spec, event) in bindings {
                    tracing::info!("Registered hotkey {} ({:?})", spec, event);
                }
                Ok(rx)
            }
            Err(RecvTimeoutError::Disconnected) => Err(RegistrationError::ListenFailed(
                "listener thread exited".to_string(),
            )),
        }
    }
}

/// Turns raw key press/release events into chord hits.
///
/// A chord fires once when its key goes down with exactly its modifiers held.
/// Auto-repeat presses are ignored until the key is released.
#[derive(Debug)]
pub struct ChordTracker {
    chords: Vec<(Key, Modifiers, HotkeyEvent)>,
    held_modifiers: Vec<Key>,
    latched: Vec<Key>,
}

impl ChordTracker {
    pub fn new(bindings: &[(HotkeySpec, HotkeyEvent)]) -> Result<Self, RegistrationError> {
        let chords = bindings
            .iter()
            .map(|(spec, event)| {
                rdev_key(spec.key)
                    .map(|key| (key, spec.modifiers, *event))
                    .ok_or_else(|| RegistrationError::UnsupportedKey(spec.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            chords,
            held_modifiers: Vec::new(),
            latched: Vec::new(),
        })
    }

    pub fn observe(&mut self, event: &EventType) -> Option<HotkeyEvent> {
        match *event {
            EventType::KeyPress(key) if is_modifier(key) => {
                if !self.held_modifiers.contains(&key) {
                    self.held_modifiers.push(key);
                }
                None
            }
            EventType::KeyRelease(key) if is_modifier(key) => {
                self.held_modifiers.retain(|k| *k != key);
                None
            }
            EventType::KeyPress(key) => {
                if self.latched.contains(&key) {
                    return None;
                }
                let held = self.modifiers();
                let hit = self
                    .chords
                    .iter()
                    .find(|(k, m, _)| *k == key && *m == held)
                    .map(|(_, _, event)| *event)?;
                self.latched.push(key);
                Some(hit)
            }
            EventType::KeyRelease(key) => {
                self.latched.retain(|k| *k != key);
                None
            }
            _ => None,
        }
    }

    fn modifiers(&self) -> Modifiers {
        let held = |keys: &[Key]| keys.iter().any(|k| self.held_modifiers.contains(k));
        Modifiers {
            ctrl: held(&[Key::ControlLeft, Key::ControlRight]),
            alt: held(&[Key::Alt, Key::AltGr]),
            shift: held(&[Key::ShiftLeft, Key::ShiftRight]),
            meta: held(&[Key::MetaLeft, Key::MetaRight]),
        }
    }
}

fn is_modifier(key: Key) -> bool {
    matches!(
        key,
        Key::ControlLeft
            | Key::ControlRight
            | Key::Alt
            | Key::AltGr
            | Key::ShiftLeft
            | Key::ShiftRight
            | Key::MetaLeft
            | Key::MetaRight
    )
}

fn rdev_key(key: HotkeyKey) -> Option<Key> {
    let mapped = match key {
        HotkeyKey::Space => Key::Space,
        HotkeyKey::Enter => Key::Return,
        HotkeyKey::Escape => Key::Escape,
        HotkeyKey::Tab => Key::Tab,
        HotkeyKey::Function(n) => match n {
            1 => Key::F1,
            2 => Key::F2,
            3 => Key::F3,
            4 => Key::F4,
            5 => Key::F5,
            6 => Key::F6,
            7 => Key::F7,
            8 => Key::F8,
            9 => Key::F9,
            10 => Key::F10,
            11 => Key::F11,
            12 => Key::F12,
            _ => return None,
        },
        HotkeyKey::Char(c) => match c.to_ascii_lowercase() {
            'a' => Key::KeyA,
            'b' => Key::KeyB,
            'c' => Key::KeyC,
            'd' => Key::KeyD,
            'e' => Key::KeyE,
            'f' => Key::KeyF,
            'g' => Key::KeyG,
            'h' => Key::KeyH,
            'i' => Key::KeyI,
            'j' => Key::KeyJ,
            'k' => Key::KeyK,
            'l' => Key::KeyL,
            'm' => Key::KeyM,
            'n' => Key::KeyN,
            'o' => Key::KeyO,
            'p' => Key::KeyP,
            'q' => Key::KeyQ,
            'r' => Key::KeyR,
            's' => Key::KeyS,
            't' => Key::KeyT,
            'u' => Key::KeyU,
            'v' => Key::KeyV,
            'w' => Key::KeyW,
            'x' => Key::KeyX,
            'y' => Key::KeyY,
            'z' => Key::KeyZ,
            '0' => Key::Num0,
            '1' => Key::Num1,
            '2' => Key::Num2,
            '3' => Key::Num3,
            '4' => Key::Num4,
            '5' => Key::Num5,
            '6' => Key::Num6,
            '7' => Key::Num7,
            '8' => Key::Num8,
            '9' => Key::Num9,
            _ => return None,
        },
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ChordTracker {
        let bindings = [
            ("ctrl+alt+a".parse().unwrap(), HotkeyEvent::Toggle),
            ("ctrl+alt+q".parse().unwrap(), HotkeyEvent::Quit),
        ];
        ChordTracker::new(&bindings).unwrap()
    }

    #[test]
    fn test_chord_fires_once_per_press() {
        let mut t = tracker();
        assert_eq!(t.observe(&EventType::KeyPress(Key::ControlLeft)), None);
        assert_eq!(t.observe(&EventType::KeyPress(Key::Alt)), None);
        assert_eq!(t.observe(&EventType::KeyPress(Key::KeyA)), Some(HotkeyEvent::Toggle));

        // Auto-repeat
        assert_eq!(t.observe(&EventType::KeyPress(Key::KeyA)), None);

        assert_eq!(t.observe(&EventType::KeyRelease(Key::KeyA)), None);
        assert_eq!(t.observe(&EventType::KeyPress(Key::KeyA)), Some(HotkeyEvent::Toggle));
    }

    #[test]
    fn test_modifiers_must_match_exactly() {
        let mut t = tracker();
        assert_eq!(t.observe(&EventType::KeyPress(Key::KeyQ)), None);

        t.observe(&EventType::KeyPress(Key::ControlRight));
        t.observe(&EventType::KeyPress(Key::Alt));
        t.observe(&EventType::KeyPress(Key::ShiftLeft));
        assert_eq!(t.observe(&EventType::KeyPress(Key::KeyQ)), None);

        t.observe(&EventType::KeyRelease(Key::KeyQ));
        t.observe(&EventType::KeyRelease(Key::ShiftLeft));
        assert_eq!(t.observe(&EventType::KeyPress(Key::KeyQ)), Some(HotkeyEvent::Quit));
    }

    #[test]
    fn test_released_modifier_breaks_chord() {
        let mut t = tracker();
        t.observe(&EventType::KeyPress(Key::ControlLeft));
        t.observe(&EventType::KeyPress(Key::Alt));
        t.observe(&EventType::KeyRelease(Key::ControlLeft));
        assert_eq!(t.observe(&EventType::KeyPress(Key::KeyA)), None);
    }

    #[test]
    fn test_unmappable_key_is_rejected() {
        let spec = HotkeySpec {
            modifiers: Modifiers::default(),
            key: HotkeyKey::Function(20),
        };
        let result = ChordTracker::new(&[(spec, HotkeyEvent::Quit)]);
        assert!(matches!(result, Err(RegistrationError::UnsupportedKey(_))));
    }
}
