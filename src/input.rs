//! Keyboard input
//!
//! Terminals deliver auto-repeat as a stream of presses and often never
//! report releases, so held keys are rate-limited per intent rather than
//! tracked as pressed/released.

use crate::game::Intent;
use crate::settings::{GameplaySettings, KeyNames};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Source of player intents
pub trait InputSource {
    /// Wait up to `timeout` for input and return the intents it produced
    fn poll(&mut self, timeout: Duration) -> anyhow::Result<Vec<Intent>>;
}

/// Key bindings - supports multiple keys per intent
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(Intent, Vec<KeyCode>)>,
}

impl KeyBindings {
    /// Parse a key name into a KeyCode
    pub fn parse_key(name: &str) -> Option<KeyCode> {
        let code = match name.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            lower => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    fn parse_keys(names: &[String]) -> Vec<KeyCode> {
        names
            .iter()
            .filter_map(|name| {
                let code = Self::parse_key(name);
                if code.is_none() {
                    tracing::warn!("Unknown key name {:?}", name);
                }
                code
            })
            .collect()
    }

    pub fn from_names(keys: &KeyNames) -> Self {
        let bindings = vec![
            (Intent::Left, Self::parse_keys(&keys.move_left)),
            (Intent::Right, Self::parse_keys(&keys.move_right)),
            (Intent::SoftDrop, Self::parse_keys(&keys.soft_drop)),
            (Intent::HardDrop, Self::parse_keys(&keys.hard_drop)),
            (Intent::RotateCW, Self::parse_keys(&keys.rotate_cw)),
            (Intent::RotateCCW, Self::parse_keys(&keys.rotate_ccw)),
            (Intent::Hold, Self::parse_keys(&keys.hold)),
            (Intent::Pause, Self::parse_keys(&keys.pause)),
            (Intent::Restart, Self::parse_keys(&keys.restart)),
            (Intent::Quit, Self::parse_keys(&keys.quit)),
        ];
        Self { bindings }
    }

    /// Intent bound to a key press. Ctrl+C always quits.
    pub fn intent_for(&self, key: &KeyEvent) -> Option<Intent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Intent::Quit);
        }
        let code = normalize_key(key.code);
        self.bindings
            .iter()
            .find(|(_, codes)| codes.contains(&code))
            .map(|(intent, _)| *intent)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_names(&KeyNames::default())
    }
}

/// Drops repeats of an intent that arrive too soon after the last accepted one
#[derive(Debug, Clone)]
pub struct Debouncer {
    last_seen: HashMap<Intent, Instant>,
    repeat: Duration,
    toggle: Duration,
}

impl Debouncer {
    pub fn new(repeat: Duration, toggle: Duration) -> Self {
        Self {
            last_seen: HashMap::new(),
            repeat,
            toggle,
        }
    }

    pub fn from_settings(gameplay: &GameplaySettings) -> Self {
        Self::new(
            Duration::from_millis(gameplay.repeat_ms),
            Duration::from_millis(gameplay.toggle_ms),
        )
    }

    /// Minimum gap between two accepted instances of `intent`
    fn gap(&self, intent: Intent) -> Duration {
        match intent {
            Intent::Left
            | Intent::Right
            | Intent::SoftDrop
            | Intent::RotateCW
            | Intent::RotateCCW => self.repeat,
            Intent::HardDrop | Intent::Hold | Intent::Pause | Intent::Restart => self.toggle,
            Intent::Quit => Duration::ZERO,
        }
    }

    pub fn accept(&mut self, intent: Intent, now: Instant) -> bool {
        let gap = self.gap(intent);
        match self.last_seen.get(&intent) {
            Some(&last) if now.saturating_duration_since(last) < gap => false,
            _ => {
                self.last_seen.insert(intent, now);
                true
            }
        }
    }
}

/// Reads key presses from the terminal via crossterm
pub struct KeyboardInput {
    bindings: KeyBindings,
    debouncer: Debouncer,
}

impl KeyboardInput {
    pub fn new(bindings: KeyBindings, debouncer: Debouncer) -> Self {
        Self {
            bindings,
            debouncer,
        }
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self, timeout: Duration) -> anyhow::Result<Vec<Intent>> {
        let mut intents = Vec::new();
        let mut wait = timeout;
        // Wait once, then drain whatever else is already queued
        while event::poll(wait)? {
            wait = Duration::ZERO;
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            if let Some(intent) = self.bindings.intent_for(&key) {
                if self.debouncer.accept(intent, Instant::now()) {
                    intents.push(intent);
                } else {
                    tracing::trace!("Debounced {:?}", intent);
                }
            }
        }
        Ok(intents)
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(KeyBindings::parse_key("Left"), Some(KeyCode::Left));
        assert_eq!(KeyBindings::parse_key("SPACE"), Some(KeyCode::Char(' ')));
        assert_eq!(KeyBindings::parse_key("escape"), Some(KeyCode::Esc));
        assert_eq!(KeyBindings::parse_key("Z"), Some(KeyCode::Char('z')));
        assert_eq!(KeyBindings::parse_key("hyper"), None);
        assert_eq!(KeyBindings::parse_key(""), None);
    }

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.intent_for(&press(KeyCode::Left)), Some(Intent::Left));
        assert_eq!(bindings.intent_for(&press(KeyCode::Up)), Some(Intent::RotateCW));
        assert_eq!(
            bindings.intent_for(&press(KeyCode::Char(' '))),
            Some(Intent::HardDrop)
        );
        assert_eq!(bindings.intent_for(&press(KeyCode::Char('r'))), Some(Intent::Restart));
        assert_eq!(bindings.intent_for(&press(KeyCode::Char('k'))), None);
    }

    #[test]
    fn test_uppercase_matches_lowercase_binding() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.intent_for(&press(KeyCode::Char('Z'))),
            Some(Intent::RotateCCW)
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let bindings = KeyBindings::default();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(bindings.intent_for(&key), Some(Intent::Quit));
        // plain 'c' is hold
        assert_eq!(bindings.intent_for(&press(KeyCode::Char('c'))), Some(Intent::Hold));
    }

    #[test]
    fn test_unknown_names_are_skipped() {
        let mut names = KeyNames::default();
        names.move_left = vec!["nonsense".to_string(), "a".to_string()];
        let bindings = KeyBindings::from_names(&names);
        assert_eq!(bindings.intent_for(&press(KeyCode::Char('a'))), Some(Intent::Left));
        assert_eq!(bindings.intent_for(&press(KeyCode::Left)), None);
    }

    #[test]
    fn test_debounce_movement() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50), Duration::from_millis(200));
        let t0 = Instant::now();
        assert!(debouncer.accept(Intent::Left, t0));
        assert!(!debouncer.accept(Intent::Left, t0 + Duration::from_millis(20)));
        // other intents are tracked separately
        assert!(debouncer.accept(Intent::Right, t0 + Duration::from_millis(20)));
        assert!(debouncer.accept(Intent::Left, t0 + Duration::from_millis(50)));
    }

    #[test]
    fn test_debounce_toggles_longer() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50), Duration::from_millis(200));
        let t0 = Instant::now();
        assert!(debouncer.accept(Intent::Pause, t0));
        assert!(!debouncer.accept(Intent::Pause, t0 + Duration::from_millis(100)));
        assert!(debouncer.accept(Intent::Pause, t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_rejected_repeat_does_not_extend_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50), Duration::from_millis(200));
        let t0 = Instant::now();
        assert!(debouncer.accept(Intent::SoftDrop, t0));
        assert!(!debouncer.accept(Intent::SoftDrop, t0 + Duration::from_millis(40)));
        assert!(debouncer.accept(Intent::SoftDrop, t0 + Duration::from_millis(55)));
    }

    #[test]
    fn test_quit_never_debounced() {
        let mut debouncer = Debouncer::from_settings(&GameplaySettings::default());
        let t0 = Instant::now();
        assert!(debouncer.accept(Intent::Quit, t0));
        assert!(debouncer.accept(Intent::Quit, t0));
    }
}
