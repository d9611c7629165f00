//! Key → command mapping

use std::collections::HashMap;

use winit::keyboard::KeyCode;

use crate::mode::ModeId;

/// Application-level command produced by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextMode,
    PrevMode,
    JumpTo(ModeId),
    ToggleWireframe,
    ToggleDepthTest,
    ToggleFreeLook,
    Quit,
}

#[derive(Debug, Clone)]
pub struct Keybindings {
    bindings: HashMap<KeyCode, Command>,
}

impl Default for Keybindings {
    fn default() -> Self {
        let mut bindings = HashMap::from([
            (KeyCode::ArrowRight, Command::NextMode),
            (KeyCode::PageDown, Command::NextMode),
            (KeyCode::ArrowLeft, Command::PrevMode),
            (KeyCode::PageUp, Command::PrevMode),
            (KeyCode::KeyP, Command::ToggleWireframe),
            (KeyCode::KeyZ, Command::ToggleDepthTest),
            (KeyCode::KeyL, Command::ToggleFreeLook),
            (KeyCode::Escape, Command::Quit),
        ]);

        let digits = [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
            KeyCode::Digit6,
            KeyCode::Digit7,
            KeyCode::Digit8,
            KeyCode::Digit9,
        ];
        for (i, key) in digits.into_iter().enumerate() {
            bindings.insert(key, Command::JumpTo(ModeId(i as u32 + 1)));
        }

        Self { bindings }
    }
}

impl Keybindings {
    /// No bindings at all
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `key`, replacing any previous binding
    pub fn bind(&mut self, key: KeyCode, command: Command) {
        self.bindings.insert(key, command);
    }

    pub fn unbind(&mut self, key: KeyCode) {
        self.bindings.remove(&key);
    }

    /// Command for a key press. Auto-repeated presses never produce commands.
    pub fn command_for(&self, key: KeyCode, repeat: bool) -> Option<Command> {
        if repeat {
            return None;
        }
        self.bindings.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = Keybindings::default();
        assert_eq!(keys.command_for(KeyCode::ArrowRight, false), Some(Command::NextMode));
        assert_eq!(keys.command_for(KeyCode::PageUp, false), Some(Command::PrevMode));
        assert_eq!(
            keys.command_for(KeyCode::Digit4, false),
            Some(Command::JumpTo(ModeId(4)))
        );
        assert_eq!(keys.command_for(KeyCode::KeyP, false), Some(Command::ToggleWireframe));
        assert_eq!(keys.command_for(KeyCode::Escape, false), Some(Command::Quit));
        assert_eq!(keys.command_for(KeyCode::KeyW, false), None);
    }

    #[test]
    fn test_repeats_are_ignored() {
        let keys = Keybindings::default();
        assert_eq!(keys.command_for(KeyCode::ArrowRight, true), None);
        assert_eq!(keys.command_for(KeyCode::KeyP, true), None);
    }

    #[test]
    fn test_rebind() {
        let mut keys = Keybindings::empty();
        keys.bind(KeyCode::KeyN, Command::NextMode);
        assert_eq!(keys.command_for(KeyCode::KeyN, false), Some(Command::NextMode));
        keys.unbind(KeyCode::KeyN);
        assert_eq!(keys.command_for(KeyCode::KeyN, false), None);
    }
}
