//! Setting up and responding to user defined key / mouse bindings
use crate::{
    core::actions::{Action, Arg},
    Error, Result,
};
use std::{collections::HashMap, process::Command};
use tracing::debug;

/// A u16 X modifier bitmask
pub type KeyCodeMask = u16;

/// A u8 X key-code value
pub type KeyCodeValue = u8;

/// Map of xmodmap key names to their X key codes
pub type CodeMap = HashMap<String, KeyCodeValue>;

pub(crate) const SHIFT_MASK: u16 = 1 << 0;
pub(crate) const LOCK_MASK: u16 = 1 << 1;
pub(crate) const CONTROL_MASK: u16 = 1 << 2;
pub(crate) const MOD1_MASK: u16 = 1 << 3;
pub(crate) const MOD4_MASK: u16 = 1 << 6;

/// The modifier value accepted by X grab requests to mean "any state".
pub(crate) const ANY_MODIFIER: u16 = 1 << 15;

// All "real" modifier bits: Shift through Mod5.
const VALID_MODS: u16 = 0xff & !LOCK_MASK;

/// Strip Lock and NumLock from an event state, leaving the modifiers a
/// binding can meaningfully match on.
pub(crate) fn clean_mask(mask: u16, numlock_mask: u16) -> u16 {
    mask & !(numlock_mask | LOCK_MASK) & VALID_MODS
}

/// A key press and held modifiers
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct KeyCode {
    /// The held modifier mask
    pub mask: KeyCodeMask,
    /// The key code that was held
    pub code: KeyCodeValue,
}

impl KeyCode {
    /// Create a new [KeyCode] from this one that removes the given mask
    pub fn ignoring_modifier(&self, mask: KeyCodeMask) -> KeyCode {
        KeyCode {
            mask: self.mask & !mask,
            code: self.code,
        }
    }
}

/// Known modifier keys for bindings
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum ModifierKey {
    /// Control
    Ctrl,
    /// Alt
    Alt,
    /// Shift
    Shift,
    /// Meta / super / windows
    Meta,
}

impl ModifierKey {
    pub(crate) fn mask(&self) -> u16 {
        match self {
            ModifierKey::Ctrl => CONTROL_MASK,
            ModifierKey::Alt => MOD1_MASK,
            ModifierKey::Shift => SHIFT_MASK,
            ModifierKey::Meta => MOD4_MASK,
        }
    }

    /// The single letter prefix used for this modifier in binding patterns.
    pub fn prefix(&self) -> &'static str {
        match self {
            ModifierKey::Ctrl => "C",
            ModifierKey::Alt => "A",
            ModifierKey::Shift => "S",
            ModifierKey::Meta => "M",
        }
    }
}

impl TryFrom<&str> for ModifierKey {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        match s {
            "C" => Ok(Self::Ctrl),
            "A" => Ok(Self::Alt),
            "S" => Ok(Self::Shift),
            "M" => Ok(Self::Meta),
            _ => Err(Error::UnknownModifier(s.into())),
        }
    }
}

/// Known mouse buttons for binding actions
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MouseButton {
    /// 1
    Left,
    /// 2
    Middle,
    /// 3
    Right,
    /// 4
    ScrollUp,
    /// 5
    ScrollDown,
}

impl From<MouseButton> for u8 {
    fn from(b: MouseButton) -> u8 {
        match b {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
            MouseButton::ScrollUp => 4,
            MouseButton::ScrollDown => 5,
        }
    }
}

/// The region of the screen a button press landed in.
///
/// Bar clicks are classified into the individual bar elements; everything
/// else is either a client window or the root.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ClickZone {
    /// A tag cell in the bar
    TagBar,
    /// The layout symbol in the bar
    LtSymbol,
    /// The status text area of the bar
    StatusText,
    /// The window title area of the bar
    WinTitle,
    /// A managed client window
    ClientWin,
    /// The root window
    RootWin,
}

/// A key binding pattern paired with the action it triggers.
///
/// Patterns are of the form `"M-S-x"`: zero or more single letter
/// modifier prefixes (M)eta, (A)lt, (C)trl, (S)hift followed by a key
/// name as reported by `xmodmap -pke`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySpec {
    /// The `"M-S-x"` style pattern to bind
    pub pattern: String,
    /// The action to run
    pub action: Action,
    /// The argument the action consumes
    pub arg: Arg,
}

/// A mouse binding: click zone, modifier prefix pattern and button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSpec {
    /// Where the click must land
    pub zone: ClickZone,
    /// Modifier prefix in the same notation as key patterns (may be empty)
    pub mods: String,
    /// The button to match
    pub button: MouseButton,
    /// The action to run
    pub action: Action,
    /// The argument the action consumes
    pub arg: Arg,
}

/// A [KeySpec] resolved against the current keymap.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub(crate) code: KeyCode,
    pub(crate) action: Action,
    pub(crate) arg: Arg,
}

/// A [ButtonSpec] resolved to raw button / mask values.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseBinding {
    pub(crate) zone: ClickZone,
    pub(crate) mask: u16,
    pub(crate) button: u8,
    pub(crate) action: Action,
    pub(crate) arg: Arg,
}

/// Run the xmodmap command to dump the system keymap table.
///
/// This is done in a form that we can load in and convert back to key
/// codes. This lets the user define key bindings in the way that they
/// would expect while also ensuring that it is easy to debug any odd
/// issues with bindings by referring the user to the xmodmap output.
pub fn keycodes_from_xmodmap() -> Result<CodeMap> {
    let output = Command::new("xmodmap").arg("-pke").output()?;
    let m = String::from_utf8(output.stdout)?;

    Ok(parse_xmodmap_output(&m))
}

// Each line is of the form 'keycode <code> = <names ...>'
fn parse_xmodmap_output(raw: &str) -> CodeMap {
    raw.lines()
        .flat_map(|l| {
            let mut words = l.split_whitespace();
            let code: Option<KeyCodeValue> = words.nth(1).and_then(|s| s.parse().ok());

            words
                .skip(1)
                .filter_map(move |name| code.map(|c| (name.to_string(), c)))
        })
        .collect()
}

/// Convert a user friendly key pattern into an X keycode and modifier
/// mask pair that can be grabbed from the server.
pub fn parse_key_pattern(pattern: &str, known_codes: &CodeMap) -> Result<KeyCode> {
    let mut parts: Vec<&str> = pattern.split('-').collect();
    let name = parts.remove(parts.len() - 1);

    let code = *known_codes
        .get(name)
        .ok_or_else(|| Error::UnknownKeyName(name.into()))?;

    let mask = parts
        .iter()
        .try_fold(0, |acc, s| ModifierKey::try_from(*s).map(|m| acc | m.mask()))?;

    debug!(%pattern, mask, code, "parsed key binding");

    Ok(KeyCode { mask, code })
}

/// Convert a modifier-only prefix (for mouse bindings) into a mask.
pub fn parse_mod_pattern(pattern: &str) -> Result<u16> {
    if pattern.is_empty() {
        return Ok(0);
    }

    pattern
        .split('-')
        .try_fold(0, |acc, s| ModifierKey::try_from(s).map(|m| acc | m.mask()))
}

/// Resolve key specs against the current keymap.
pub fn resolve_keys(specs: &[KeySpec], codes: &CodeMap) -> Result<Vec<KeyBinding>> {
    specs
        .iter()
        .map(|s| {
            parse_key_pattern(&s.pattern, codes).map(|code| KeyBinding {
                code,
                action: s.action,
                arg: s.arg.clone(),
            })
        })
        .collect()
}

/// Resolve button specs to raw masks and button numbers.
pub fn resolve_buttons(specs: &[ButtonSpec]) -> Result<Vec<MouseBinding>> {
    specs
        .iter()
        .map(|s| {
            parse_mod_pattern(&s.mods).map(|mask| MouseBinding {
                zone: s.zone,
                mask,
                button: s.button.into(),
                action: s.action,
                arg: s.arg.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    const XMODMAP: &str = "\
keycode  10 = 1 exclam 1 exclam
keycode  24 = q Q q Q
keycode  36 = Return NoSymbol Return
keycode  50 = Shift_L NoSymbol Shift_L
keycode 999 = bogus
";

    fn codes() -> CodeMap {
        parse_xmodmap_output(XMODMAP)
    }

    #[test]
    fn parses_name_to_code_pairs() {
        let m = codes();

        assert_eq!(m.get("1"), Some(&10));
        assert_eq!(m.get("q"), Some(&24));
        assert_eq!(m.get("Return"), Some(&36));
        // out of range keycodes are dropped rather than wrapped
        assert_eq!(m.get("bogus"), None);
    }

    #[test_case("M-q", MOD4_MASK, 24; "single modifier")]
    #[test_case("M-S-1", MOD4_MASK | SHIFT_MASK, 10; "two modifiers")]
    #[test_case("Return", 0, 36; "no modifier")]
    #[test]
    fn valid_patterns_parse(pattern: &str, mask: u16, code: u8) {
        let parsed = parse_key_pattern(pattern, &codes()).expect("valid pattern");

        assert_eq!(parsed, KeyCode { mask, code });
    }

    #[test]
    fn unknown_key_name_is_an_error() {
        assert!(matches!(
            parse_key_pattern("M-nosuchkey", &codes()),
            Err(Error::UnknownKeyName(_))
        ));
    }

    #[test]
    fn unknown_modifier_is_an_error() {
        assert!(matches!(
            parse_key_pattern("X-q", &codes()),
            Err(Error::UnknownModifier(_))
        ));
    }

    #[test_case("", 0; "empty")]
    #[test_case("M", MOD4_MASK; "meta")]
    #[test_case("M-S", MOD4_MASK | SHIFT_MASK; "meta shift")]
    #[test]
    fn mod_patterns_parse(pattern: &str, expected: u16) {
        assert_eq!(parse_mod_pattern(pattern).expect("valid"), expected);
    }

    #[test]
    fn clean_mask_strips_locks_only() {
        let numlock = 1 << 4; // Mod2
        let raw = SHIFT_MASK | LOCK_MASK | numlock | MOD4_MASK;

        assert_eq!(clean_mask(raw, numlock), SHIFT_MASK | MOD4_MASK);
    }
}
