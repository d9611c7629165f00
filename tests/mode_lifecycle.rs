//! Mode switching and resource lifetime tests.
//!
//! These tests drive the full [`Sandbox`] over the dummy backend and check
//! that every GPU object a mode creates is gone once the mode is left.
//!
//! ```bash
//! cargo test --test mode_lifecycle
//! ```

mod common;

use std::cell::Cell;
use std::rc::Rc;

use rstest::rstest;
use winit::keyboard::KeyCode;

use common::{bundled_sandbox, config, run_frames, sandbox_with, scratch_assets, tap, DT};
use demo_sandbox::backend::dummy::{RecordedCommand, ResourceKind};
use demo_sandbox::backend::{GraphicsBackend, PolygonMode};
use demo_sandbox::error::ModeError;
use demo_sandbox::mode::{FrameContext, MachineState, ProgramLayout, SetupContext};
use demo_sandbox::{demos, DemoMode, ModeId, ModeRegistry, SandboxConfig, TransitionError};

// ============================================================================
// Bundled Demos
// ============================================================================

/// Every bundled demo enters, draws and leaves without leaking.
#[rstest]
#[case::hello_window(1)]
#[case::hello_triangle(2)]
#[case::hello_rectangle(3)]
#[case::light_2d(4)]
#[case::pulsing_color(5)]
#[case::vertex_colors(6)]
#[case::textured_quad(7)]
#[case::rotating_quad(8)]
#[case::spinning_cube(9)]
#[case::free_look(10)]
#[case::phong(11)]
fn test_demo_enters_draws_and_releases(#[case] id: u32) {
    let mut sandbox = bundled_sandbox(id);
    assert_eq!(sandbox.machine().state(), MachineState::Active(ModeId(id)));

    run_frames(&mut sandbox, 3);
    assert_eq!(sandbox.gpu().frames_presented(), 3);
    assert_eq!(sandbox.gpu().invalid_draws(), 0);
    if id != 1 {
        assert!(sandbox.gpu().draw_count() >= 3, "mode {} drew nothing", id);
    }

    let live = sandbox.gpu().live_resources().total();
    assert_eq!(live, sandbox.machine().live_mode_resources());

    sandbox.shutdown();
    assert_eq!(sandbox.gpu().live_resources().total(), 0);
    assert_eq!(sandbox.gpu().invalid_destroys(), 0);
}

/// Stepping through every mode and back leaves only the active one alive.
#[test]
fn test_stepping_through_all_modes_does_not_leak() {
    let mut sandbox = bundled_sandbox(1);
    let baseline = sandbox.gpu().live_resources();

    for expected in 2..=11 {
        tap(&mut sandbox, KeyCode::ArrowRight);
        assert_eq!(sandbox.machine().active_id(), Some(ModeId(expected)));
        assert_eq!(
            sandbox.gpu().live_resources().total(),
            sandbox.machine().live_mode_resources()
        );
    }
    for _ in 2..=11 {
        tap(&mut sandbox, KeyCode::ArrowLeft);
    }

    assert_eq!(sandbox.machine().active_id(), Some(ModeId(1)));
    assert_eq!(sandbox.gpu().live_resources(), baseline);
    assert_eq!(sandbox.gpu().invalid_destroys(), 0);
}

#[rstest]
#[case::triangle(2)]
#[case::light_2d(4)]
#[case::textured_quad(7)]
#[case::free_look(10)]
fn test_next_then_prev_restores_counts(#[case] id: u32) {
    let mut sandbox = bundled_sandbox(id);
    let before = sandbox.gpu().live_resources();

    tap(&mut sandbox, KeyCode::ArrowRight);
    tap(&mut sandbox, KeyCode::ArrowLeft);

    assert_eq!(sandbox.machine().active_id(), Some(ModeId(id)));
    assert_eq!(sandbox.gpu().live_resources(), before);
}

#[test]
fn test_next_twice_from_first_mode() {
    let mut sandbox = bundled_sandbox(1);
    tap(&mut sandbox, KeyCode::PageDown);
    tap(&mut sandbox, KeyCode::PageDown);
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(3)));
}

#[test]
fn test_next_past_last_mode_is_ignored() {
    let mut sandbox = bundled_sandbox(11);
    tap(&mut sandbox, KeyCode::ArrowRight);
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(11)));
    assert!(sandbox.is_running());
}

#[test]
fn test_jump_to_unknown_mode_keeps_running() {
    let mut sandbox = bundled_sandbox(2);
    let before = sandbox.gpu().live_resources();

    sandbox.queue(demo_sandbox::keybindings::Command::JumpTo(ModeId(999)));
    sandbox.frame(DT);

    assert!(sandbox.is_running());
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(2)));
    assert_eq!(sandbox.gpu().live_resources(), before);
    assert_eq!(sandbox.gpu().frames_presented(), 1);
}

#[test]
fn test_digit_keys_jump_directly() {
    let mut sandbox = bundled_sandbox(1);
    tap(&mut sandbox, KeyCode::Digit9);
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(9)));
    tap(&mut sandbox, KeyCode::Digit4);
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(4)));
}

/// Each pass sets the raster state first, and a new mode never draws with
/// the previous mode's pipelines.
#[test]
fn test_switching_modes_draws_only_with_new_pipelines() {
    let mut sandbox = bundled_sandbox(2);
    run_frames(&mut sandbox, 1);
    let old_pipelines = sandbox.gpu().drawn_pipelines();
    assert!(!old_pipelines.is_empty());

    tap(&mut sandbox, KeyCode::ArrowRight);
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(3)));

    let drawn = sandbox.gpu().drawn_pipelines();
    let new_pipelines = &drawn[old_pipelines.len()..];
    assert!(!new_pipelines.is_empty());
    assert!(new_pipelines.iter().all(|p| !old_pipelines.contains(p)));

    let commands = sandbox.gpu().commands();
    for (i, command) in commands.iter().enumerate() {
        if let RecordedCommand::BeginPass { .. } = command {
            assert!(matches!(commands[i + 1], RecordedCommand::SetRasterState(_)));
        }
    }
}

// ============================================================================
// Render Toggles
// ============================================================================

#[test]
fn test_wireframe_toggled_twice_restores_state() {
    let mut sandbox = bundled_sandbox(2);
    let initial = sandbox.flags().wireframe();

    tap(&mut sandbox, KeyCode::KeyP);
    assert_eq!(sandbox.flags().wireframe(), !initial);
    tap(&mut sandbox, KeyCode::KeyP);
    assert_eq!(sandbox.flags().wireframe(), initial);

    let states = sandbox.gpu().raster_states();
    assert_eq!(states.len(), 2);
    assert_ne!(states[0].polygon_mode, states[1].polygon_mode);
}

#[test]
fn test_wireframe_falls_back_to_fill_without_support() {
    let config = SandboxConfig {
        wireframe: true,
        ..config(2)
    };
    let mut sandbox = demo_sandbox::Sandbox::new(
        demo_sandbox::DummyBackend::new().without_wireframe(),
        demos::registry(),
        &config,
    )
    .unwrap();
    run_frames(&mut sandbox, 2);

    assert!(sandbox.flags().wireframe());
    assert!(sandbox
        .gpu()
        .raster_states()
        .iter()
        .all(|s| s.polygon_mode == PolygonMode::Fill));
}

#[test]
fn test_depth_toggle_reaches_backend() {
    let mut sandbox = bundled_sandbox(9);
    tap(&mut sandbox, KeyCode::KeyZ);
    let last = *sandbox.gpu().raster_states().last().unwrap();
    assert!(last.depth_test);
}

// ============================================================================
// Failed Entry
// ============================================================================

/// Mode whose program points at files that do not exist
#[derive(Default)]
struct MissingProgram;

impl DemoMode for MissingProgram {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        ctx.vertex_buffer("v", &[0.0f32; 9])?;
        ctx.program(
            "shaders/does-not-exist.vert.wgsl",
            "shaders/does-not-exist.frag.wgsl",
            ProgramLayout::default(),
        )?;
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        ctx.gpu.draw(0..3, 0..1);
    }
}

#[test]
fn test_missing_shader_falls_back_to_previous_mode() {
    let mut registry = demos::registry();
    registry.register_default::<MissingProgram>(12, "Missing Program");
    let mut sandbox = sandbox_with(registry, config(11));
    let before = sandbox.gpu().live_resources();

    tap(&mut sandbox, KeyCode::ArrowRight);

    assert_eq!(sandbox.machine().state(), MachineState::Active(ModeId(11)));
    assert_eq!(sandbox.gpu().live_resources(), before);
    assert_eq!(sandbox.gpu().invalid_draws(), 0);
}

#[test]
fn test_invalid_wgsl_never_draws() {
    let assets = scratch_assets("invalid-wgsl");
    std::fs::write(
        assets.join("shaders/hello-triangle.frag.wgsl"),
        "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }",
    )
    .unwrap();
    let config = SandboxConfig {
        asset_dir: assets.clone(),
        ..config(1)
    };
    let mut sandbox = sandbox_with(demos::registry(), config);

    tap(&mut sandbox, KeyCode::ArrowRight);
    run_frames(&mut sandbox, 2);

    assert_eq!(sandbox.machine().active_id(), Some(ModeId(1)));
    assert_eq!(sandbox.gpu().live_resources().render_pipelines, 0);
    assert_eq!(sandbox.gpu().draw_count(), 0);

    // Modes with intact shaders are unaffected
    tap(&mut sandbox, KeyCode::Digit6);
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(6)));

    sandbox.shutdown();
    let _ = std::fs::remove_dir_all(assets);
}

#[rstest]
#[case::buffer(ResourceKind::Buffer)]
#[case::bind_group(ResourceKind::BindGroup)]
#[case::pipeline(ResourceKind::RenderPipeline)]
#[case::sampler(ResourceKind::Sampler)]
fn test_partial_setup_is_released(#[case] kind: ResourceKind) {
    let mut sandbox = bundled_sandbox(1);
    let before = sandbox.gpu().live_resources();

    sandbox.gpu_mut().fail_next(kind);
    tap(&mut sandbox, KeyCode::Digit8);

    assert_eq!(sandbox.machine().active_id(), Some(ModeId(1)));
    assert_eq!(sandbox.gpu().live_resources(), before);
    assert_eq!(sandbox.gpu().invalid_destroys(), 0);
}

#[test]
fn test_failed_start_mode_faults_then_recovers() {
    let mut registry = ModeRegistry::new();
    registry.register_default::<MissingProgram>(1, "Missing Program");
    registry.register_default::<demos::HelloWindow>(2, "Hello Window");
    let mut sandbox = sandbox_with(registry, config(1));

    assert_eq!(sandbox.machine().state(), MachineState::Faulted(ModeId(1)));
    assert_eq!(sandbox.gpu().live_resources().total(), 0);
    run_frames(&mut sandbox, 1);
    assert_eq!(sandbox.gpu().frames_presented(), 1);

    tap(&mut sandbox, KeyCode::ArrowRight);
    assert_eq!(sandbox.machine().state(), MachineState::Active(ModeId(2)));
}

// ============================================================================
// Teardown
// ============================================================================

struct CountingTeardown {
    teardowns: Rc<Cell<u32>>,
}

impl DemoMode for CountingTeardown {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        ctx.vertex_buffer("v", &[0.0f32; 9])?;
        Ok(())
    }

    fn frame(&mut self, _ctx: &mut FrameContext<'_>) {}

    fn teardown(&mut self) {
        self.teardowns.set(self.teardowns.get() + 1);
    }
}

#[test]
fn test_teardown_runs_once_and_shutdown_is_idempotent() {
    let teardowns = Rc::new(Cell::new(0));
    let mut registry = ModeRegistry::new();
    let counter = Rc::clone(&teardowns);
    registry.register(1, "Counting", move || {
        Box::new(CountingTeardown {
            teardowns: Rc::clone(&counter),
        })
    });
    registry.register_default::<demos::HelloWindow>(2, "Hello Window");

    let mut sandbox = sandbox_with(registry, config(1));
    tap(&mut sandbox, KeyCode::ArrowRight);
    assert_eq!(teardowns.get(), 1);

    tap(&mut sandbox, KeyCode::ArrowLeft);
    sandbox.shutdown();
    sandbox.shutdown();
    assert_eq!(teardowns.get(), 2);
    assert_eq!(sandbox.machine().state(), MachineState::Stopped);
    assert_eq!(sandbox.gpu().live_resources().total(), 0);

    drop(sandbox);
    assert_eq!(teardowns.get(), 2);
}

#[test]
fn test_transitions_after_shutdown_are_refused() {
    let mut gpu = demo_sandbox::DummyBackend::new();
    let mut machine = demo_sandbox::ModeMachine::new(demos::registry(), common::assets_dir());
    machine.shutdown(&mut gpu);
    assert!(matches!(machine.jump(&mut gpu, ModeId(2)), Err(TransitionError::Stopped)));
    assert_eq!(gpu.live_resources().total(), 0);
}
