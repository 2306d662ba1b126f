//! Customizable keybindings for the widget.
//!
//! Mode hotkeys and view/edit shortcuts are stored as serde-friendly key
//! codes so they round-trip through the widget configuration file.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SvatError};
use crate::message::Modifiers;
use crate::mode::Mode;

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Plus,
    Minus,
    Equal,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Delete,
    Backspace,
    Escape,
    Space,
}

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    SetMode(Mode),
    ResetZoom,
    ZoomIn,
    ZoomOut,
    DeleteSelected,
    /// Abort the current drag
    Cancel,
    Undo,
    Redo,
    /// Move the selection by a unit step in viewport pixels (before scaling by the nudge step)
    Nudge { dx: f64, dy: f64 },
}

/// Keybinding configuration for the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Hotkey for Analysis mode
    pub mode_analysis: KeyCode,
    /// Hotkey for Harmonics mode
    pub mode_harmonics: KeyCode,
    /// Hotkey for Doppler mode
    pub mode_doppler: KeyCode,
    /// Hotkey for Pan mode
    pub mode_pan: KeyCode,
    pub reset_zoom: KeyCode,
    pub zoom_in: KeyCode,
    pub zoom_out: KeyCode,
    pub delete_selected: KeyCode,
    pub cancel: KeyCode,
    /// Undo, pressed together with Ctrl
    pub undo: KeyCode,
    /// Redo, pressed together with Ctrl
    pub redo: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            mode_analysis: KeyCode::A,
            mode_harmonics: KeyCode::H,
            mode_doppler: KeyCode::D,
            mode_pan: KeyCode::P,
            reset_zoom: KeyCode::R,
            zoom_in: KeyCode::Plus,
            zoom_out: KeyCode::Minus,
            delete_selected: KeyCode::Delete,
            cancel: KeyCode::Escape,
            undo: KeyCode::Z,
            redo: KeyCode::Y,
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the mode that corresponds to a key press, if any.
    pub fn mode_for_key(&self, key: KeyCode) -> Option<Mode> {
        Mode::all()
            .iter()
            .copied()
            .find(|mode| self.key_for_mode(*mode) == key)
    }

    /// Get the hotkey for a specific mode.
    pub fn key_for_mode(&self, mode: Mode) -> KeyCode {
        match mode {
            Mode::Analysis => self.mode_analysis,
            Mode::Harmonics => self.mode_harmonics,
            Mode::Doppler => self.mode_doppler,
            Mode::Pan => self.mode_pan,
        }
    }

    /// Set the hotkey for a mode.
    pub fn set_mode_key(&mut self, mode: Mode, key: KeyCode) {
        match mode {
            Mode::Analysis => self.mode_analysis = key,
            Mode::Harmonics => self.mode_harmonics = key,
            Mode::Doppler => self.mode_doppler = key,
            Mode::Pan => self.mode_pan = key,
        }
    }

    /// Resolve a key press to an action.
    ///
    /// Ctrl combinations only trigger undo/redo; arrow keys always nudge.
    pub fn action_for_key(&self, key: KeyCode, modifiers: Modifiers) -> Option<KeyAction> {
        if modifiers.ctrl {
            return if key == self.undo {
                Some(KeyAction::Undo)
            } else if key == self.redo {
                Some(KeyAction::Redo)
            } else {
                None
            };
        }

        let nudge = |dx, dy| Some(KeyAction::Nudge { dx, dy });
        match key {
            KeyCode::ArrowLeft => return nudge(-1.0, 0.0),
            KeyCode::ArrowRight => return nudge(1.0, 0.0),
            KeyCode::ArrowUp => return nudge(0.0, -1.0),
            KeyCode::ArrowDown => return nudge(0.0, 1.0),
            _ => {}
        }

        if let Some(mode) = self.mode_for_key(key) {
            Some(KeyAction::SetMode(mode))
        } else if key == self.reset_zoom {
            Some(KeyAction::ResetZoom)
        } else if key == self.zoom_in || (self.zoom_in == KeyCode::Plus && key == KeyCode::Equal) {
            // '=' shares a physical key with '+' on most layouts
            Some(KeyAction::ZoomIn)
        } else if key == self.zoom_out {
            Some(KeyAction::ZoomOut)
        } else if key == self.delete_selected || key == KeyCode::Backspace {
            Some(KeyAction::DeleteSelected)
        } else if key == self.cancel {
            Some(KeyAction::Cancel)
        } else {
            None
        }
    }

    /// Reject bindings where two modes share a hotkey.
    pub fn validate(&self) -> Result<()> {
        for mode in Mode::all() {
            let key = self.key_for_mode(*mode);
            if let Some(used_by) = self.key_conflict(key, Some(*mode)) {
                return Err(SvatError::KeyConflict {
                    key: key_to_string(key),
                    mode: mode.name(),
                    used_by,
                });
            }
        }
        Ok(())
    }

    /// Check if a key is already used by a mode binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: KeyCode, exclude_mode: Option<Mode>) -> Option<String> {
        Mode::all()
            .iter()
            .filter(|mode| Some(**mode) != exclude_mode)
            .find(|mode| self.key_for_mode(**mode) == key)
            .map(|mode| format!("{} mode", mode.name()))
    }
}

/// Convert a KeyCode to a display string.
pub fn key_to_string(key: KeyCode) -> &'static str {
    match key {
        KeyCode::A => "A",
        KeyCode::B => "B",
        KeyCode::C => "C",
        KeyCode::D => "D",
        KeyCode::E => "E",
        KeyCode::F => "F",
        KeyCode::G => "G",
        KeyCode::H => "H",
        KeyCode::I => "I",
        KeyCode::J => "J",
        KeyCode::K => "K",
        KeyCode::L => "L",
        KeyCode::M => "M",
        KeyCode::N => "N",
        KeyCode::O => "O",
        KeyCode::P => "P",
        KeyCode::Q => "Q",
        KeyCode::R => "R",
        KeyCode::S => "S",
        KeyCode::T => "T",
        KeyCode::U => "U",
        KeyCode::V => "V",
        KeyCode::W => "W",
        KeyCode::X => "X",
        KeyCode::Y => "Y",
        KeyCode::Z => "Z",
        KeyCode::Key0 => "0",
        KeyCode::Key1 => "1",
        KeyCode::Key2 => "2",
        KeyCode::Key3 => "3",
        KeyCode::Key4 => "4",
        KeyCode::Key5 => "5",
        KeyCode::Key6 => "6",
        KeyCode::Key7 => "7",
        KeyCode::Key8 => "8",
        KeyCode::Key9 => "9",
        KeyCode::Plus => "+",
        KeyCode::Minus => "-",
        KeyCode::Equal => "=",
        KeyCode::ArrowLeft => "←",
        KeyCode::ArrowRight => "→",
        KeyCode::ArrowUp => "↑",
        KeyCode::ArrowDown => "↓",
        KeyCode::Delete => "Del",
        KeyCode::Backspace => "Backspace",
        KeyCode::Escape => "Esc",
        KeyCode::Space => "Space",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_keys() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.mode_for_key(KeyCode::A), Some(Mode::Analysis));
        assert_eq!(bindings.mode_for_key(KeyCode::H), Some(Mode::Harmonics));
        assert_eq!(bindings.mode_for_key(KeyCode::D), Some(Mode::Doppler));
        assert_eq!(bindings.mode_for_key(KeyCode::P), Some(Mode::Pan));
        assert_eq!(bindings.mode_for_key(KeyCode::Q), None);
    }

    #[test]
    fn test_actions() {
        let bindings = KeyBindings::default();
        let none = Modifiers::default();
        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };

        assert_eq!(bindings.action_for_key(KeyCode::R, none), Some(KeyAction::ResetZoom));
        assert_eq!(bindings.action_for_key(KeyCode::Equal, none), Some(KeyAction::ZoomIn));
        assert_eq!(bindings.action_for_key(KeyCode::Z, ctrl), Some(KeyAction::Undo));
        assert_eq!(bindings.action_for_key(KeyCode::Y, ctrl), Some(KeyAction::Redo));
        // Ctrl+A is not a mode switch
        assert_eq!(bindings.action_for_key(KeyCode::A, ctrl), None);
        assert_eq!(
            bindings.action_for_key(KeyCode::ArrowUp, none),
            Some(KeyAction::Nudge { dx: 0.0, dy: -1.0 })
        );
    }

    #[test]
    fn test_rebinding_and_conflicts() {
        let mut bindings = KeyBindings::default();
        bindings.set_mode_key(Mode::Pan, KeyCode::Space);
        assert_eq!(bindings.mode_for_key(KeyCode::Space), Some(Mode::Pan));
        assert_eq!(bindings.mode_for_key(KeyCode::P), None);

        assert_eq!(
            bindings.key_conflict(KeyCode::H, None),
            Some("Harmonics mode".to_string())
        );
        assert_eq!(bindings.key_conflict(KeyCode::H, Some(Mode::Harmonics)), None);
    }

    #[test]
    fn test_validate_rejects_shared_mode_key() {
        let mut bindings = KeyBindings::default();
        assert!(bindings.validate().is_ok());

        bindings.set_mode_key(Mode::Doppler, KeyCode::H);
        let err = bindings.validate().expect_err("H bound twice");
        assert_eq!(
            err.to_string(),
            "Key 'H' for Harmonics mode is already used by Doppler mode"
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let mut bindings = KeyBindings::default();
        bindings.set_mode_key(Mode::Doppler, KeyCode::Key3);
        let json = serde_json::to_string(&bindings).expect("serialize");
        let parsed: KeyBindings = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, bindings);

        // Missing fields fall back to defaults
        let partial: KeyBindings =
            serde_json::from_str(r#"{"mode_pan":"Space"}"#).expect("deserialize");
        assert_eq!(partial.mode_pan, KeyCode::Space);
        assert_eq!(partial.mode_analysis, KeyCode::A);
    }
}
