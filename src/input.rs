//! Key bindings: turning terminal key events into session commands

use crate::engine::Action;
use crate::session::Command;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key bindings configuration - supports multiple keys per command
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub drop: Vec<KeyCode>,
    pub show_next: Vec<KeyCode>,
    pub toggle_lines: Vec<KeyCode>,
    pub speed_up: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode. Unknown names bind nothing.
    fn parse_key(s: &str) -> Option<KeyCode> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(KeyCode::Char(c.to_ascii_lowercase()));
        }
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            _ => {
                tracing::warn!("unknown key name {s:?} in bindings");
                return None;
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().filter_map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            rotate: Self::parse_keys(&keys.rotate),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            drop: Self::parse_keys(&keys.drop),
            show_next: Self::parse_keys(&keys.show_next),
            toggle_lines: Self::parse_keys(&keys.toggle_lines),
            speed_up: Self::parse_keys(&keys.speed_up),
            pause: Self::parse_keys(&keys.pause),
            quit: Self::parse_keys(&keys.quit),
        }
    }

    /// Resolve a key press. Keys bound to nothing are [`Command::Unknown`].
    pub fn command(&self, key: KeyEvent) -> Command {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Command::Quit;
        }

        let code = normalize_key(key.code);
        let table = [
            (&self.move_left, Command::Play(Action::MoveLeft)),
            (&self.move_right, Command::Play(Action::MoveRight)),
            (&self.rotate, Command::Play(Action::Rotate)),
            (&self.soft_drop, Command::Play(Action::Down)),
            (&self.drop, Command::DropAndEvaluate),
            (&self.show_next, Command::ShowNext),
            (&self.toggle_lines, Command::ToggleDottedLines),
            (&self.speed_up, Command::SpeedUp),
            (&self.pause, Command::Pause),
            (&self.quit, Command::Quit),
        ];
        table
            .into_iter()
            .find(|(codes, _)| codes.contains(&code))
            .map_or(Command::Unknown, |(_, command)| command)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
