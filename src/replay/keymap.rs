//! Key symbol to input event code mapping.
//!
//! Capture logs name keys by symbol ("a", "Space", "LeftShift"); the replay
//! side needs Linux input event codes. The mapping is built once at startup
//! and handed to the plan builder and emitter; nothing mutates it afterwards.

use std::collections::HashMap;

/// A Linux input event code (a `KEY_*` constant from input-event-codes.h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

/// Symbol table covering the keys the capture side can report.
const QWERTY_TABLE: &[(&str, u16)] = &[
    // Letters
    ("a", 30),
    ("b", 48),
    ("c", 46),
    ("d", 32),
    ("e", 18),
    ("f", 33),
    ("g", 34),
    ("h", 35),
    ("i", 23),
    ("j", 36),
    ("k", 37),
    ("l", 38),
    ("m", 50),
    ("n", 49),
    ("o", 24),
    ("p", 25),
    ("q", 16),
    ("r", 19),
    ("s", 31),
    ("t", 20),
    ("u", 22),
    ("v", 47),
    ("w", 17),
    ("x", 45),
    ("y", 21),
    ("z", 44),
    // Digits (top row)
    ("1", 2),
    ("2", 3),
    ("3", 4),
    ("4", 5),
    ("5", 6),
    ("6", 7),
    ("7", 8),
    ("8", 9),
    ("9", 10),
    ("0", 11),
    // Punctuation
    ("`", 41),
    ("-", 12),
    ("=", 13),
    ("[", 26),
    ("]", 27),
    ("\\", 43),
    (";", 39),
    ("'", 40),
    (",", 51),
    (".", 52),
    ("/", 53),
    // Whitespace / control
    ("Space", 57),
    ("Tab", 15),
    ("Enter", 28),
    ("Backspace", 14),
    // Modifiers
    ("LeftShift", 42),
    ("RightShift", 54),
    ("LeftCtrl", 29),
    ("RightCtrl", 97),
    ("LeftAlt", 56),
    ("RightAlt", 100),
    ("CapsLock", 58),
    // Navigation
    ("Esc", 1),
    ("Up", 103),
    ("Down", 108),
    ("Left", 105),
    ("Right", 106),
    ("Home", 102),
    ("End", 107),
    ("PageUp", 104),
    ("PageDown", 109),
    ("Insert", 110),
    ("Delete", 111),
    // Function keys
    ("F1", 59),
    ("F2", 60),
    ("F3", 61),
    ("F4", 62),
    ("F5", 63),
    ("F6", 64),
    ("F7", 65),
    ("F8", 66),
    ("F9", 67),
    ("F10", 68),
    ("F11", 87),
    ("F12", 88),
];

/// Immutable key symbol lookup table.
#[derive(Debug, Clone)]
pub struct KeyMap {
    codes: HashMap<&'static str, KeyCode>,
}

impl KeyMap {
    /// Build the standard QWERTY mapping.
    pub fn qwerty() -> Self {
        let codes = QWERTY_TABLE
            .iter()
            .map(|&(symbol, code)| (symbol, KeyCode(code)))
            .collect();
        Self { codes }
    }

    /// Resolve a key symbol to its event code.
    pub fn resolve(&self, symbol: &str) -> Option<KeyCode> {
        self.codes.get(symbol).copied()
    }

    /// All event codes in the table, for registering a virtual device.
    pub fn codes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.codes.values().copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::qwerty()
    }
}
