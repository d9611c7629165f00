//! Layer stack
//!
//! Layers get every event that the application did not consume and an
//! update call once per frame. Events travel from the top of the stack
//! (last overlay) down and stop at the first layer that handles them;
//! updates run bottom-up. Overlays always sit above regular layers.

use std::collections::VecDeque;

use winit::keyboard::KeyCode;

use crate::event::{Event, EventKind};
use crate::input::InputState;
use crate::mode::ModeId;

/// Per-frame state visible to layers
#[derive(Debug, Clone, Copy)]
pub struct LayerContext<'a> {
    pub dt: f32,
    pub frame_index: u64,
    pub active_mode: Option<ModeId>,
    pub input: &'a InputState,
}

pub trait Layer {
    fn name(&self) -> &str;

    fn on_attach(&mut self) {}

    fn on_detach(&mut self) {}

    fn on_update(&mut self, _ctx: &LayerContext<'_>) {}

    /// Set `event.handled` to stop delivery to the layers below
    fn on_event(&mut self, _event: &mut Event) {}
}

#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
    /// Regular layers occupy `layers[..insert_index]`, overlays the rest
    insert_index: usize,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a layer above the existing layers but below every overlay
    pub fn push_layer(&mut self, mut layer: Box<dyn Layer>) {
        layer.on_attach();
        log::debug!("Layer attached: {}", layer.name());
        self.layers.insert(self.insert_index, layer);
        self.insert_index += 1;
    }

    /// Put an overlay on top of the stack
    pub fn push_overlay(&mut self, mut overlay: Box<dyn Layer>) {
        overlay.on_attach();
        log::debug!("Overlay attached: {}", overlay.name());
        self.layers.push(overlay);
    }

    /// Detach the regular layer called `name`
    pub fn pop_layer(&mut self, name: &str) -> Option<Box<dyn Layer>> {
        let index = self.layers[..self.insert_index]
            .iter()
            .position(|l| l.name() == name)?;
        let mut layer = self.layers.remove(index);
        self.insert_index -= 1;
        layer.on_detach();
        Some(layer)
    }

    /// Detach the overlay called `name`
    pub fn pop_overlay(&mut self, name: &str) -> Option<Box<dyn Layer>> {
        let index = self.layers[self.insert_index..]
            .iter()
            .position(|l| l.name() == name)?
            + self.insert_index;
        let mut overlay = self.layers.remove(index);
        overlay.on_detach();
        Some(overlay)
    }

    /// Deliver an event top-down until a layer handles it
    pub fn dispatch_event(&mut self, event: &mut Event) {
        for layer in self.layers.iter_mut().rev() {
            if event.handled {
                break;
            }
            layer.on_event(event);
        }
    }

    /// Update every layer bottom-up
    pub fn update(&mut self, ctx: &LayerContext<'_>) {
        for layer in self.layers.iter_mut() {
            layer.on_update(ctx);
        }
    }

    /// Layer names bottom-up
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Drop for LayerStack {
    fn drop(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.on_detach();
        }
    }
}

/// Traces keyboard input
#[derive(Debug, Default)]
pub struct InputTraceLayer;

impl Layer for InputTraceLayer {
    fn name(&self) -> &str {
        "InputTrace"
    }

    fn on_update(&mut self, ctx: &LayerContext<'_>) {
        if ctx.input.is_key_pressed(KeyCode::Tab) {
            log::trace!("Tab key is pressed (poll)");
        }
    }

    fn on_event(&mut self, event: &mut Event) {
        if let EventKind::KeyPressed { key, repeat } = &event.kind {
            log::trace!("Key pressed: {:?} (repeat: {})", key, repeat);
        }
    }
}

/// Rolling frame time average, reported once per second
#[derive(Debug)]
pub struct FrameStatsLayer {
    samples: VecDeque<f32>,
    window: usize,
    since_report: f32,
}

impl Default for FrameStatsLayer {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameStatsLayer {
    pub fn new(window: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(window.max(1)),
            window: window.max(1),
            since_report: 0.0,
        }
    }

    /// Mean frame time over the window, in seconds
    pub fn average_frame_time(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let average = self.average_frame_time();
        if average > 0.0 {
            1.0 / average
        } else {
            0.0
        }
    }
}

impl Layer for FrameStatsLayer {
    fn name(&self) -> &str {
        "FrameStats"
    }

    fn on_update(&mut self, ctx: &LayerContext<'_>) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(ctx.dt);

        self.since_report += ctx.dt;
        if self.since_report >= 1.0 {
            self.since_report = 0.0;
            log::debug!(
                "{:.1} fps ({:.2} ms) in mode {:?}",
                self.fps(),
                self.average_frame_time() * 1000.0,
                ctx.active_mode.map(|m| m.0)
            );
        }
    }
}
