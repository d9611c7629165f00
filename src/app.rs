//! winit application shell

use std::time::Instant;

use winit::{
    event::Event,
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
};

use crate::backend::wgpu_backend::WgpuBackend;
use crate::demos;
use crate::error::SandboxError;
use crate::layer::{FrameStatsLayer, InputTraceLayer};
use crate::mode::ModeRegistry;
use crate::sandbox::Sandbox;
use crate::window::{translate_event, Window};
use crate::SandboxConfig;

/// Run the sandbox with the bundled demos until the window is closed
pub fn run(config: SandboxConfig) -> Result<(), SandboxError> {
    run_with_registry(config, demos::registry())
}

/// Run the sandbox with a custom set of modes
pub fn run_with_registry(config: SandboxConfig, registry: ModeRegistry) -> Result<(), SandboxError> {
    let event_loop = EventLoop::new()?;
    let window = Window::new(&event_loop, &config.title, config.width, config.height)?;
    let gpu = WgpuBackend::new(window.window_arc(), config.vsync)?;

    let mut sandbox = Sandbox::new(gpu, registry, &config)?;
    sandbox.push_layer(Box::new(InputTraceLayer));
    sandbox.push_overlay(Box::new(FrameStatsLayer::default()));

    let mut last_frame = Instant::now();
    let mut frames = 0u64;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => {
                if let Some(kind) = translate_event(&event) {
                    sandbox.handle_event(kind);
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                let dt = now.duration_since(last_frame).as_secs_f32();
                last_frame = now;

                sandbox.frame(dt);
                frames += 1;
                if config.max_frames.is_some_and(|max| frames >= max) {
                    log::info!("Reached {} frames, exiting", frames);
                    sandbox.request_quit();
                }
                if let Some(title) = sandbox.take_title_change() {
                    window.set_title(&title);
                }
                window.request_redraw();
            }
            Event::LoopExiting => {
                sandbox.shutdown();
            }
            _ => {}
        }

        if !sandbox.is_running() {
            sandbox.shutdown();
            elwt.exit();
        }
    })?;

    Ok(())
}
