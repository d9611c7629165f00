//! Window-independent frame driver.
//!
//! [`Sandbox`] receives events, turns bound key presses into commands,
//! applies those commands once per frame and drives the active mode. The
//! winit glue in [`crate::app`] only translates events and calls
//! [`Sandbox::frame`]; tests drive the same type over a
//! [`DummyBackend`](crate::backend::DummyBackend).

use crate::backend::{GraphicsBackend, RenderPassDescriptor};
use crate::error::{SandboxError, TransitionError};
use crate::event::{Event, EventKind};
use crate::input::InputState;
use crate::keybindings::{Command, Keybindings};
use crate::layer::{Layer, LayerContext, LayerStack};
use crate::mode::machine::FrameInput;
use crate::mode::{MachineState, ModeMachine, ModeRegistry};
use crate::render_state::RenderFlags;
use crate::SandboxConfig;

pub struct Sandbox<B: GraphicsBackend> {
    gpu: B,
    machine: ModeMachine,
    layers: LayerStack,
    input: InputState,
    keybindings: Keybindings,
    flags: RenderFlags,
    commands: Vec<Command>,
    running: bool,
    title: String,
    title_changed: bool,
    frame_index: u64,
}

impl<B: GraphicsBackend> Sandbox<B> {
    /// Build the sandbox and enter the configured start mode.
    ///
    /// An unregistered start mode falls back to the first registered one. A
    /// start mode that fails to set up leaves the sandbox running in the
    /// faulted state so the user can navigate away.
    pub fn new(gpu: B, registry: ModeRegistry, config: &SandboxConfig) -> Result<Self, SandboxError> {
        let first = registry.first().ok_or(SandboxError::NoModes)?;
        let start = if registry.contains(config.start_mode) {
            config.start_mode
        } else {
            log::warn!(
                "Start mode {} is not registered, starting at {}",
                config.start_mode,
                first
            );
            first
        };

        let mut sandbox = Self {
            gpu,
            machine: ModeMachine::new(registry, config.asset_dir.clone()),
            layers: LayerStack::new(),
            input: InputState::new(),
            keybindings: Keybindings::default(),
            flags: RenderFlags::new(config.wireframe, config.depth_test),
            commands: Vec::new(),
            running: true,
            title: config.title.clone(),
            title_changed: true,
            frame_index: 0,
        };

        log::info!("Sandbox using {} backend", sandbox.gpu.name());
        if let Err(e) = sandbox.machine.start(&mut sandbox.gpu, start) {
            log::error!("Initial mode failed: {}", e);
        }
        Ok(sandbox)
    }

    pub fn gpu(&self) -> &B {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut B {
        &mut self.gpu
    }

    pub fn machine(&self) -> &ModeMachine {
        &self.machine
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn flags(&self) -> &RenderFlags {
        &self.flags
    }

    pub fn keybindings_mut(&mut self) -> &mut Keybindings {
        &mut self.keybindings
    }

    pub fn push_layer(&mut self, layer: Box<dyn Layer>) {
        self.layers.push_layer(layer);
    }

    pub fn push_overlay(&mut self, overlay: Box<dyn Layer>) {
        self.layers.push_overlay(overlay);
    }

    pub fn layers_mut(&mut self) -> &mut LayerStack {
        &mut self.layers
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Queue a command for the next frame
    pub fn queue(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Stop the frame loop after the current iteration
    pub fn request_quit(&mut self) {
        self.running = false;
    }

    /// Window title for the current mode, once per change
    pub fn take_title_change(&mut self) -> Option<String> {
        if !self.title_changed {
            return None;
        }
        self.title_changed = false;
        Some(match (self.machine.state(), self.machine.active_title()) {
            (MachineState::Active(id), Some(mode)) => format!("{} - {}: {}", self.title, id, mode),
            (MachineState::Faulted(id), _) => format!("{} - {}: failed to load", self.title, id),
            _ => self.title.clone(),
        })
    }

    /// Handle one event. Application bindings see it first, then the layers
    /// from the top of the stack down.
    pub fn handle_event(&mut self, kind: EventKind) {
        let mut event = Event::new(kind);
        self.input.apply(&event.kind);

        match event.kind {
            EventKind::WindowClose => {
                self.running = false;
                event.handled = true;
            }
            EventKind::WindowResize { width, height } => {
                self.gpu.resize(width, height);
            }
            EventKind::KeyPressed { key, repeat } => {
                if let Some(command) = self.keybindings.command_for(key, repeat) {
                    self.commands.push(command);
                    event.handled = true;
                }
            }
            _ => {}
        }

        if !event.handled {
            self.layers.dispatch_event(&mut event);
        }
    }

    fn apply_commands(&mut self) {
        for command in std::mem::take(&mut self.commands) {
            if !self.running {
                break;
            }
            let before = self.machine.state();
            let result = match command {
                Command::NextMode => self.machine.next(&mut self.gpu),
                Command::PrevMode => self.machine.prev(&mut self.gpu),
                Command::JumpTo(id) => self.machine.jump(&mut self.gpu, id),
                Command::ToggleWireframe => {
                    self.flags.toggle_wireframe();
                    Ok(())
                }
                Command::ToggleDepthTest => {
                    self.flags.toggle_depth_test();
                    Ok(())
                }
                Command::ToggleFreeLook => {
                    let enabled = self.machine.camera_mut().toggle_look_around();
                    log::info!("Free look {}", if enabled { "on" } else { "off" });
                    Ok(())
                }
                Command::Quit => {
                    self.running = false;
                    Ok(())
                }
            };

            match result {
                Ok(()) | Err(TransitionError::UnknownMode(_)) => {}
                Err(e) => log::debug!("{:?} not applied: {}", command, e),
            }
            if self.machine.state() != before {
                self.title_changed = true;
            }
        }
    }

    /// Run one frame: commands, camera, draw, layers, present.
    pub fn frame(&mut self, dt: f32) {
        self.apply_commands();

        if self.running {
            self.machine.camera_mut().update(&self.input, dt);
            self.draw(dt);
        }

        self.layers.update(&LayerContext {
            dt,
            frame_index: self.frame_index,
            active_mode: self.machine.active_id(),
            input: &self.input,
        });
        self.frame_index += 1;
        self.input.reset_deltas();
    }

    fn draw(&mut self, dt: f32) {
        let info = match self.gpu.begin_frame() {
            Ok(info) => info,
            Err(e) if e.is_surface_error() => {
                log::warn!("{}, reconfiguring surface", e);
                let (width, height) = self.gpu.surface_size();
                self.gpu.resize(width, height);
                return;
            }
            Err(e) => {
                log::error!("Skipping frame: {}", e);
                return;
            }
        };

        let raster = self.flags.raster_state(self.gpu.supports_wireframe());
        self.gpu.begin_render_pass(&RenderPassDescriptor {
            label: Some("Main Pass".into()),
            clear_color: self.machine.clear_color(),
            clear_depth: 1.0,
        });
        self.gpu.set_raster_state(raster);
        self.machine.render(
            &mut self.gpu,
            FrameInput {
                dt,
                viewport: (info.width, info.height),
                input: &self.input,
            },
        );
        self.gpu.end_render_pass();

        if let Err(e) = self.gpu.end_frame() {
            log::error!("Failed to present frame {}: {}", info.index, e);
        }
    }

    /// Tear down the active mode. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.machine.shutdown(&mut self.gpu);
    }
}

impl<B: GraphicsBackend> Drop for Sandbox<B> {
    fn drop(&mut self) {
        // Modes must release their objects before the backend goes away
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::error::ModeError;
    use crate::mode::{DemoMode, FrameContext, ModeId, SetupContext};
    use winit::keyboard::KeyCode;

    #[derive(Default)]
    struct Clear;

    impl DemoMode for Clear {
        fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
            ctx.vertex_buffer("quad", &[0.0f32; 12])?;
            Ok(())
        }

        fn frame(&mut self, _ctx: &mut FrameContext<'_>) {}
    }

    fn sandbox() -> Sandbox<DummyBackend> {
        let mut registry = ModeRegistry::new();
        registry.register_default::<Clear>(1, "one");
        registry.register_default::<Clear>(2, "two");
        Sandbox::new(DummyBackend::new(), registry, &SandboxConfig::default()).unwrap()
    }

    fn press(sandbox: &mut Sandbox<DummyBackend>, key: KeyCode) {
        sandbox.handle_event(EventKind::KeyPressed { key, repeat: false });
        sandbox.handle_event(EventKind::KeyReleased { key });
    }

    #[test]
    fn test_empty_registry_is_an_error() {
        let result = Sandbox::new(DummyBackend::new(), ModeRegistry::new(), &SandboxConfig::default());
        assert!(matches!(result, Err(SandboxError::NoModes)));
    }

    #[test]
    fn test_commands_apply_on_next_frame() {
        let mut sandbox = sandbox();
        press(&mut sandbox, KeyCode::ArrowRight);
        assert_eq!(sandbox.machine().active_id(), Some(ModeId(1)));
        sandbox.frame(0.016);
        assert_eq!(sandbox.machine().active_id(), Some(ModeId(2)));
    }

    #[test]
    fn test_title_changes_once_per_switch() {
        let mut sandbox = sandbox();
        assert_eq!(sandbox.take_title_change().as_deref(), Some("Sparky Sandbox - 1: one"));
        assert_eq!(sandbox.take_title_change(), None);

        press(&mut sandbox, KeyCode::Digit2);
        sandbox.frame(0.016);
        assert_eq!(sandbox.take_title_change().as_deref(), Some("Sparky Sandbox - 2: two"));
    }

    #[test]
    fn test_escape_stops_running() {
        let mut sandbox = sandbox();
        press(&mut sandbox, KeyCode::Escape);
        sandbox.frame(0.016);
        assert!(!sandbox.is_running());
        assert_eq!(sandbox.gpu().frames_presented(), 0);
    }

    #[test]
    fn test_window_close_stops_running() {
        let mut sandbox = sandbox();
        sandbox.handle_event(EventKind::WindowClose);
        assert!(!sandbox.is_running());
        sandbox.shutdown();
        assert_eq!(sandbox.gpu().live_resources().total(), 0);
    }

    #[test]
    fn test_unknown_start_mode_uses_first() {
        let mut registry = ModeRegistry::new();
        registry.register_default::<Clear>(3, "three");
        let config = SandboxConfig {
            start_mode: ModeId(42),
            ..Default::default()
        };
        let sandbox = Sandbox::new(DummyBackend::new(), registry, &config).unwrap();
        assert_eq!(sandbox.machine().active_id(), Some(ModeId(3)));
    }
}
