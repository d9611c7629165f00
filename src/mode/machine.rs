//! Mode switching state machine.
//!
//! Exactly one mode owns GPU resources at any time. Leaving a mode runs its
//! teardown hook and releases its [`ResourceScope`] before the next mode's
//! setup starts. A mode whose setup fails never becomes active: whatever it
//! created is released and the previously active mode is entered again.

use std::path::{Path, PathBuf};

use crate::backend::GraphicsBackend;
use crate::camera::FlyCamera;
use crate::error::{ModeError, TransitionError};
use crate::input::InputState;
use crate::mode::{DemoMode, FrameContext, ModeId, ModeRegistry, ResourceScope, SetupContext};

/// Clear colour used while no mode could be entered
pub const FAULT_CLEAR_COLOR: [f32; 4] = [0.35, 0.0, 0.0, 1.0];

/// Clear colour before the first mode is entered
pub const IDLE_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// Nothing entered yet
    Idle,
    Active(ModeId),
    /// Entering this mode failed and no fallback could be entered
    Faulted(ModeId),
    /// Shut down, no further transitions
    Stopped,
}

/// Per-frame inputs forwarded to the active mode
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub dt: f32,
    pub viewport: (u32, u32),
    pub input: &'a InputState,
}

struct ActiveMode {
    id: ModeId,
    mode: Box<dyn DemoMode>,
    scope: ResourceScope,
    time: f32,
}

pub struct ModeMachine {
    registry: ModeRegistry,
    assets: PathBuf,
    state: MachineState,
    active: Option<ActiveMode>,
    camera: FlyCamera,
}

impl ModeMachine {
    pub fn new(registry: ModeRegistry, assets: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            assets: assets.into(),
            state: MachineState::Idle,
            active: None,
            camera: FlyCamera::default(),
        }
    }

    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    pub fn assets(&self) -> &Path {
        &self.assets
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn active_id(&self) -> Option<ModeId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn active_title(&self) -> Option<&str> {
        self.active_id().and_then(|id| self.registry.title(id))
    }

    /// Number of objects owned by the active mode
    pub fn live_mode_resources(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.scope.len())
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FlyCamera {
        &mut self.camera
    }

    /// Id navigation is relative to: the active mode, or the mode that faulted
    fn cursor(&self) -> Option<ModeId> {
        match self.state {
            MachineState::Active(id) | MachineState::Faulted(id) => Some(id),
            MachineState::Idle | MachineState::Stopped => None,
        }
    }

    /// First entry
    pub fn start(
        &mut self,
        gpu: &mut dyn GraphicsBackend,
        id: ModeId,
    ) -> Result<(), TransitionError> {
        if self.state != MachineState::Idle {
            log::warn!("start() called in state {:?}", self.state);
        }
        self.jump(gpu, id)
    }

    /// Go to the mode with the next id. There is no wrap-around.
    pub fn next(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<(), TransitionError> {
        let target = match self.cursor() {
            Some(id) => ModeId(id.0.saturating_add(1)),
            None => self.registry.first().unwrap_or(ModeId(1)),
        };
        self.jump(gpu, target)
    }

    /// Go to the mode with the previous id. There is no wrap-around.
    pub fn prev(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<(), TransitionError> {
        let target = match self.cursor() {
            Some(id) => ModeId(id.0.saturating_sub(1)),
            None => self.registry.first().unwrap_or(ModeId(1)),
        };
        self.jump(gpu, target)
    }

    /// Switch to `target`.
    ///
    /// Unknown ids are rejected without touching the active mode. Jumping to
    /// the active mode does nothing.
    pub fn jump(
        &mut self,
        gpu: &mut dyn GraphicsBackend,
        target: ModeId,
    ) -> Result<(), TransitionError> {
        if self.state == MachineState::Stopped {
            return Err(TransitionError::Stopped);
        }
        if !self.registry.contains(target) {
            log::warn!("Ignoring switch to unregistered mode {}", target);
            return Err(TransitionError::UnknownMode(target));
        }
        if self.active_id() == Some(target) {
            return Ok(());
        }

        let previous = self.active_id();
        self.leave(gpu);

        let source = match self.enter(gpu, target) {
            Ok(()) => return Ok(()),
            Err(source) => source,
        };
        log::error!("Failed to enter mode {}: {}", target, source);

        let fallback = previous.filter(|&id| match self.enter(gpu, id) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to re-enter mode {}: {}", id, e);
                false
            }
        });
        if fallback.is_none() {
            self.state = MachineState::Faulted(target);
        }

        Err(TransitionError::SetupFailed {
            mode: target,
            source,
            fallback,
        })
    }

    fn enter(&mut self, gpu: &mut dyn GraphicsBackend, id: ModeId) -> Result<(), ModeError> {
        let Some(mut mode) = self.registry.instantiate(id) else {
            // contains() was checked by the caller
            return Ok(());
        };

        self.camera.reset(mode.camera_settings());

        let mut scope = ResourceScope::new(id);
        let result = mode.setup(&mut SetupContext::new(gpu, &mut scope, &self.assets));
        if let Err(e) = result {
            let released = scope.release(gpu);
            log::debug!("mode {}: released {} resources of failed entry", id, released);
            return Err(e);
        }

        log::info!(
            "Entering mode {} \"{}\" ({} resources)",
            id,
            self.registry.title(id).unwrap_or_default(),
            scope.len()
        );
        self.active = Some(ActiveMode {
            id,
            mode,
            scope,
            time: 0.0,
        });
        self.state = MachineState::Active(id);
        Ok(())
    }

    fn leave(&mut self, gpu: &mut dyn GraphicsBackend) {
        if let Some(mut active) = self.active.take() {
            active.mode.teardown();
            let released = active.scope.release(gpu);
            log::info!("Leaving mode {} ({} resources released)", active.id, released);
        }
    }

    /// Clear colour for the current frame
    pub fn clear_color(&self) -> [f32; 4] {
        match (&self.active, self.state) {
            (Some(active), _) => active.mode.clear_color(),
            (None, MachineState::Faulted(_)) => FAULT_CLEAR_COLOR,
            (None, _) => IDLE_CLEAR_COLOR,
        }
    }

    /// Run the active mode's frame inside the already open main pass
    pub fn render(&mut self, gpu: &mut dyn GraphicsBackend, frame: FrameInput<'_>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.time += frame.dt;

        let mut ctx = FrameContext {
            gpu,
            time: active.time,
            dt: frame.dt,
            cursor: frame.input.cursor_position(),
            viewport: frame.viewport,
            camera: &self.camera,
            input: frame.input,
        };
        active.mode.frame(&mut ctx);
    }

    /// Tear down the active mode and refuse further transitions. Idempotent.
    pub fn shutdown(&mut self, gpu: &mut dyn GraphicsBackend) {
        if self.state == MachineState::Stopped {
            return;
        }
        self.leave(gpu);
        self.state = MachineState::Stopped;
        log::info!("Mode machine stopped");
    }
}

impl Drop for ModeMachine {
    fn drop(&mut self) {
        if self.active.is_some() {
            log::error!("ModeMachine dropped without shutdown()");
        }
    }
}
