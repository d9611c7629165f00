//! Engine events delivered to the sandbox and its layers

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Event category flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCategory(u32);

impl EventCategory {
    pub const NONE: Self = Self(0);
    pub const APPLICATION: Self = Self(1 << 0);
    pub const INPUT: Self = Self(1 << 1);
    pub const KEYBOARD: Self = Self(1 << 2);
    pub const MOUSE: Self = Self(1 << 3);
    pub const MOUSE_BUTTON: Self = Self(1 << 4);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for EventCategory {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    WindowClose,
    WindowResize { width: u32, height: u32 },
    KeyPressed { key: KeyCode, repeat: bool },
    KeyReleased { key: KeyCode },
    MouseMoved { x: f32, y: f32 },
    MouseScrolled { dx: f32, dy: f32 },
    MouseButtonPressed(MouseButton),
    MouseButtonReleased(MouseButton),
}

impl EventKind {
    pub fn category(&self) -> EventCategory {
        match self {
            EventKind::WindowClose | EventKind::WindowResize { .. } => EventCategory::APPLICATION,
            EventKind::KeyPressed { .. } | EventKind::KeyReleased { .. } => {
                EventCategory::INPUT | EventCategory::KEYBOARD
            }
            EventKind::MouseMoved { .. } | EventKind::MouseScrolled { .. } => {
                EventCategory::INPUT | EventCategory::MOUSE
            }
            EventKind::MouseButtonPressed(_) | EventKind::MouseButtonReleased(_) => {
                EventCategory::INPUT | EventCategory::MOUSE | EventCategory::MOUSE_BUTTON
            }
        }
    }
}

/// An event travelling through the layer stack
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// Set by whoever consumed the event; delivery stops there
    pub handled: bool,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            handled: false,
        }
    }

    pub fn category(&self) -> EventCategory {
        self.kind.category()
    }

    pub fn is_in_category(&self, category: EventCategory) -> bool {
        self.category().contains(category)
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let key = Event::new(EventKind::KeyPressed {
            key: KeyCode::Tab,
            repeat: false,
        });
        assert!(key.is_in_category(EventCategory::KEYBOARD));
        assert!(key.is_in_category(EventCategory::INPUT));
        assert!(!key.is_in_category(EventCategory::MOUSE));

        let click = Event::new(EventKind::MouseButtonPressed(MouseButton::Left));
        assert!(click.is_in_category(EventCategory::MOUSE | EventCategory::MOUSE_BUTTON));

        let close = Event::new(EventKind::WindowClose);
        assert!(close.is_in_category(EventCategory::APPLICATION));
        assert!(!close.is_in_category(EventCategory::INPUT));
    }
}
