//! Keyboard shortcuts.
//!
//! Hotkeys are written as `"mod+b"`: `+`-separated modifiers followed by the key. `mod` matches
//! either Ctrl or Meta so one table serves every platform.

use crate::commands::{Command, EditCommand, FormatCommand};
use crate::node::Mark;

/// Mark hotkeys, in lookup order.
pub const MARK_HOTKEYS: &[(&str, Mark)] = &[
    ("mod+b", Mark::Bold),
    ("mod+i", Mark::Italic),
    ("mod+u", Mark::Underline),
    ("mod+`", Mark::Code),
];

/// A key press as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStroke {
    /// Key name (`"b"`, `"Enter"`, `"Tab"`, ...).
    pub key: String,
    /// Control held.
    pub ctrl: bool,
    /// Meta / Command held.
    pub meta: bool,
    /// Shift held.
    pub shift: bool,
    /// Alt / Option held.
    pub alt: bool,
}

impl KeyStroke {
    /// A key press without modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// With Control held.
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// With Meta held.
    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// With Shift held.
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// With Alt held.
    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

/// Returns `true` if `stroke` satisfies `hotkey`.
///
/// Required modifiers must be held; extra modifiers are tolerated. Keys compare
/// case-insensitively.
pub fn is_hotkey(hotkey: &str, stroke: &KeyStroke) -> bool {
    let hotkey = hotkey.to_lowercase();
    let parts: Vec<&str> = hotkey.split('+').collect();
    let Some(key) = parts.last() else {
        return false;
    };
    let modifiers = &parts[..parts.len() - 1];
    let wants = |name: &str| modifiers.iter().any(|modifier| *modifier == name);

    (!wants("mod") || stroke.ctrl || stroke.meta)
        && (!wants("shift") || stroke.shift)
        && (!wants("alt") || stroke.alt)
        && stroke.key.to_lowercase() == *key
}

/// The mark toggled by `stroke`, if any.
pub fn mark_for_key(stroke: &KeyStroke) -> Option<Mark> {
    MARK_HOTKEYS
        .iter()
        .find(|(hotkey, _)| is_hotkey(hotkey, stroke))
        .map(|(_, mark)| *mark)
}

/// The command bound to `stroke`.
///
/// Mark hotkeys work everywhere; Tab and Shift+Enter are only bound inside a code line.
pub fn command_for_key(stroke: &KeyStroke, in_code_line: bool) -> Option<Command> {
    if let Some(mark) = mark_for_key(stroke) {
        return Some(Command::Format(FormatCommand::ToggleMark { mark }));
    }
    if !in_code_line {
        return None;
    }
    if is_hotkey("tab", stroke) {
        return Some(Command::Edit(EditCommand::InsertTab));
    }
    if is_hotkey("shift+enter", stroke) {
        return Some(Command::Edit(EditCommand::ExitCodeBlock));
    }
    None
}
