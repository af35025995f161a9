//! Keyboard shortcuts for the overlay.
//!
//! The dispatcher is a plain lookup from a physical key to an [`Operation`]. It
//! never decides whether an operation is allowed: operations that would interfere
//! with typing into the search box check focus themselves. The same bindings feed
//! the help overlay and the `keys` command.

use std::collections::HashMap;

use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TourError};
use crate::indicator::ProgressIndicator;
use crate::navigator::StepNavigator;

/// Navigator operations a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Previous,
    Next,
    FocusSearch,
    Toggle,
    Hide,
    Show,
    ToggleNav,
}

/// Categories for organizing shortcuts in help output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationCategory {
    Navigation,
    Chrome,
    Search,
}

impl OperationCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            OperationCategory::Navigation => "Navigation",
            OperationCategory::Chrome => "Overlay",
            OperationCategory::Search => "Search",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [OperationCategory] {
        &[
            OperationCategory::Navigation,
            OperationCategory::Chrome,
            OperationCategory::Search,
        ]
    }
}

impl Operation {
    pub fn description(&self) -> &'static str {
        match self {
            Operation::Previous => "Previous step",
            Operation::Next => "Next step",
            Operation::FocusSearch => "Focus search box",
            Operation::Toggle => "Toggle overlay",
            Operation::Hide => "Hide overlay",
            Operation::Show => "Show overlay",
            Operation::ToggleNav => "Toggle navigation panel",
        }
    }

    pub fn category(&self) -> OperationCategory {
        match self {
            Operation::Previous | Operation::Next => OperationCategory::Navigation,
            Operation::Toggle | Operation::Hide | Operation::Show | Operation::ToggleNav => {
                OperationCategory::Chrome
            }
            Operation::FocusSearch => OperationCategory::Search,
        }
    }
}

/// One configured key binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    pub key: String,
    pub operation: Operation,
}

impl HotkeyBinding {
    pub fn new(key: &str, operation: Operation) -> Self {
        Self {
            key: key.to_string(),
            operation,
        }
    }
}

pub fn default_bindings() -> Vec<HotkeyBinding> {
    vec![
        HotkeyBinding::new("Up", Operation::Previous),
        HotkeyBinding::new("Left", Operation::Previous),
        HotkeyBinding::new("Down", Operation::Next),
        HotkeyBinding::new("Right", Operation::Next),
        HotkeyBinding::new("s", Operation::FocusSearch),
        HotkeyBinding::new("t", Operation::Toggle),
        HotkeyBinding::new("Escape", Operation::Hide),
        HotkeyBinding::new("h", Operation::ToggleNav),
    ]
}

/// Parse a key name as written in configuration.
///
/// Accepts terminal spellings (`Up`, `Esc`) and DOM spellings (`ArrowUp`,
/// `Escape`), case-insensitively. A single character names that character key.
pub fn parse_key(name: &str) -> Result<KeyCode> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(normalize(KeyCode::Char(ch)));
    }
    if name == " " {
        return Ok(KeyCode::Char(' '));
    }

    let lower = trimmed.to_ascii_lowercase();
    let code = match lower.as_str() {
        "up" | "arrowup" => KeyCode::Up,
        "down" | "arrowdown" => KeyCode::Down,
        "left" | "arrowleft" => KeyCode::Left,
        "right" | "arrowright" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "space" | "spacebar" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n) if (1..=24).contains(&n) => KeyCode::F(n),
            _ => return Err(TourError::UnknownKey(name.to_string())),
        },
    };
    Ok(code)
}

/// Character keys are matched regardless of case.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_lowercase().next().unwrap_or(c)),
        other => other,
    }
}

/// Format a KeyCode for display
pub fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => format!("{key:?}"),
    }
}

/// A key-down event as seen by operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: KeyCode,
    default_prevented: bool,
}

impl KeyPress {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            default_prevented: false,
        }
    }

    /// Keep the key from reaching its default target (e.g. the focused search box).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// All keys bound to one operation, for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub keys: Vec<KeyCode>,
    pub operation: Operation,
}

impl Shortcut {
    /// Format keys for display (e.g., "↑/←")
    pub fn key_display(&self) -> String {
        self.keys
            .iter()
            .map(format_keycode)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Format keys for the help overlay (left-padded to 7 chars)
    pub fn key_display_padded(&self) -> String {
        format!("{:<7}", self.key_display())
    }
}

#[derive(Debug, Clone)]
pub struct HotkeyDispatcher {
    map: HashMap<KeyCode, Operation>,
    /// Bindings in configuration order, for display
    order: Vec<(KeyCode, Operation)>,
}

impl Default for HotkeyDispatcher {
    fn default() -> Self {
        // Default names are all valid
        Self::from_bindings(&default_bindings()).unwrap_or_else(|_| Self::empty())
    }
}

impl HotkeyDispatcher {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build from configured bindings. A later binding for the same key wins.
    pub fn from_bindings(bindings: &[HotkeyBinding]) -> Result<Self> {
        let mut dispatcher = Self::empty();
        for binding in bindings {
            let code = parse_key(&binding.key)?;
            dispatcher.bind(code, binding.operation);
        }
        Ok(dispatcher)
    }

    pub fn bind(&mut self, code: KeyCode, operation: Operation) {
        let code = normalize(code);
        self.order.retain(|(bound, _)| *bound != code);
        self.order.push((code, operation));
        self.map.insert(code, operation);
    }

    pub fn lookup(&self, code: KeyCode) -> Option<Operation> {
        self.map.get(&normalize(code)).copied()
    }

    /// Invoke the operation bound to `event`'s key on `navigator`.
    ///
    /// Returns the operation that was invoked, if any.
    pub fn dispatch<I: ProgressIndicator>(
        &self,
        navigator: &mut StepNavigator<I>,
        event: &mut KeyPress,
    ) -> Option<Operation> {
        let operation = self.lookup(event.code)?;
        tracing::trace!(key = ?event.code, ?operation, "hotkey");
        navigator.perform(operation, event);
        Some(operation)
    }

    /// Shortcuts grouped per operation, in first-binding order.
    pub fn shortcuts(&self) -> Vec<Shortcut> {
        let mut shortcuts: Vec<Shortcut> = Vec::new();
        for (code, operation) in &self.order {
            match shortcuts.iter_mut().find(|s| s.operation == *operation) {
                Some(shortcut) => shortcut.keys.push(*code),
                None => shortcuts.push(Shortcut {
                    keys: vec![*code],
                    operation: *operation,
                }),
            }
        }
        shortcuts
    }

    /// Shortcuts grouped by category, skipping empty categories.
    pub fn shortcuts_by_category(&self) -> Vec<(OperationCategory, Vec<Shortcut>)> {
        let shortcuts = self.shortcuts();
        OperationCategory::all()
            .iter()
            .filter_map(|category| {
                let group: Vec<Shortcut> = shortcuts
                    .iter()
                    .filter(|s| s.operation.category() == *category)
                    .cloned()
                    .collect();
                (!group.is_empty()).then_some((*category, group))
            })
            .collect()
    }
}
