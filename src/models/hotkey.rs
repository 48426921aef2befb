use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Modifier keys that must be held for a hotkey to fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// The non-modifier key of a hotkey chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyKey {
    /// `a`-`z` (stored lowercase) or `0`-`9`
    Char(char),
    /// `f1`-`f12`
    Function(u8),
    Space,
    Enter,
    Escape,
    Tab,
}

/// A parsed global hotkey such as `ctrl+alt+a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeySpec {
    pub modifiers: Modifiers,
    pub key: HotkeyKey,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyParseError {
    #[error("hotkey is empty")]
    Empty,

    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("modifier '{0}' given twice")]
    DuplicateModifier(String),
}

impl FromStr for HotkeySpec {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<String> = s
            .split('+')
            .map(|t| t.trim().to_ascii_lowercase())
            .collect();

        let Some((key_token, modifier_tokens)) = tokens.split_last() else {
            return Err(HotkeyParseError::Empty);
        };
        if key_token.is_empty() {
            return Err(HotkeyParseError::Empty);
        }

        let mut modifiers = Modifiers::default();
        for token in modifier_tokens {
            let slot = match token.as_str() {
                "ctrl" | "control" => &mut modifiers.ctrl,
                "alt" | "option" => &mut modifiers.alt,
                "shift" => &mut modifiers.shift,
                "meta" | "super" | "win" | "cmd" | "command" => &mut modifiers.meta,
                "" => return Err(HotkeyParseError::Empty),
                other => return Err(HotkeyParseError::UnknownModifier(other.to_string())),
            };
            if *slot {
                return Err(HotkeyParseError::DuplicateModifier(token.clone()));
            }
            *slot = true;
        }

        Ok(Self {
            modifiers,
            key: parse_key(key_token)?,
        })
    }
}

fn parse_key(token: &str) -> Result<HotkeyKey, HotkeyParseError> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            return Ok(HotkeyKey::Char(c));
        }
    }

    match token {
        "space" => Ok(HotkeyKey::Space),
        "enter" | "return" => Ok(HotkeyKey::Enter),
        "escape" | "esc" => Ok(HotkeyKey::Escape),
        "tab" => Ok(HotkeyKey::Tab),
        _ => token
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=12).contains(n))
            .map(HotkeyKey::Function)
            .ok_or_else(|| HotkeyParseError::UnknownKey(token.to_string())),
    }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        for (held, name) in [(m.ctrl, "ctrl"), (m.alt, "alt"), (m.shift, "shift"), (m.meta, "meta")] {
            if held {
                write!(f, "{}+", name)?;
            }
        }
        match self.key {
            HotkeyKey::Char(c) => write!(f, "{}", c),
            HotkeyKey::Function(n) => write!(f, "f{}", n),
            HotkeyKey::Space => f.write_str("space"),
            HotkeyKey::Enter => f.write_str("enter"),
            HotkeyKey::Escape => f.write_str("escape"),
            HotkeyKey::Tab => f.write_str("tab"),
        }
    }
}
