//! Window management using winit

use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::{Window as WinitWindow, WindowBuilder},
};

use crate::error::SandboxError;
use crate::event::EventKind;

/// Wrapper around the winit window
pub struct Window {
    window: Arc<WinitWindow>,
}

impl Window {
    /// Create a new window with the given title and dimensions
    pub fn new(
        event_loop: &EventLoop<()>,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, SandboxError> {
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .build(event_loop)?;

        Ok(Self {
            window: Arc::new(window),
        })
    }

    /// Get arc reference to window for backend initialization
    pub fn window_arc(&self) -> Arc<WinitWindow> {
        Arc::clone(&self.window)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    /// Request a redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

/// Translate a winit window event into a sandbox event
pub fn translate_event(event: &WindowEvent) -> Option<EventKind> {
    match event {
        WindowEvent::CloseRequested => Some(EventKind::WindowClose),
        WindowEvent::Resized(size) => Some(EventKind::WindowResize {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::KeyboardInput { event, .. } => {
            let PhysicalKey::Code(key) = event.physical_key else {
                return None;
            };
            Some(match event.state {
                ElementState::Pressed => EventKind::KeyPressed {
                    key,
                    repeat: event.repeat,
                },
                ElementState::Released => EventKind::KeyReleased { key },
            })
        }
        WindowEvent::CursorMoved { position, .. } => Some(EventKind::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                // Roughly one line per 20 pixels
                MouseScrollDelta::PixelDelta(p) => (p.x as f32 / 20.0, p.y as f32 / 20.0),
            };
            Some(EventKind::MouseScrolled { dx, dy })
        }
        WindowEvent::MouseInput { state, button, .. } => Some(match state {
            ElementState::Pressed => EventKind::MouseButtonPressed(*button),
            ElementState::Released => EventKind::MouseButtonReleased(*button),
        }),
        _ => None,
    }
}
