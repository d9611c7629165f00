//! Polled input state

use std::collections::HashSet;

use glam::Vec2;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::event::EventKind;

/// Keys and buttons currently held, plus per-frame mouse deltas
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    cursor: Vec2,
    cursor_delta: Vec2,
    scroll_delta: f32,
    has_cursor: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an event into the state
    pub fn apply(&mut self, event: &EventKind) {
        match event {
            EventKind::KeyPressed { key, .. } => {
                self.keys.insert(*key);
            }
            EventKind::KeyReleased { key } => {
                self.keys.remove(key);
            }
            EventKind::MouseButtonPressed(button) => {
                self.buttons.insert(*button);
            }
            EventKind::MouseButtonReleased(button) => {
                self.buttons.remove(button);
            }
            EventKind::MouseMoved { x, y } => {
                let position = Vec2::new(*x, *y);
                // The first sample has no previous position to diff against
                if self.has_cursor {
                    self.cursor_delta += position - self.cursor;
                }
                self.cursor = position;
                self.has_cursor = true;
            }
            EventKind::MouseScrolled { dy, .. } => {
                self.scroll_delta += *dy;
            }
            EventKind::WindowClose | EventKind::WindowResize { .. } => {}
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    /// Cursor movement since the last `reset_deltas`
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Clear per-frame deltas (call at the end of every frame)
    pub fn reset_deltas(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}
