//! Demo Sandbox - a real-time rendering sandbox that switches between numbered demo scenes
//!
//! The sandbox owns a window, a graphics backend and a registry of demo
//! modes. Exactly one mode is active at a time; every GPU object a mode
//! creates is recorded in its resource scope and released when the mode is
//! left, so switching back and forth never leaks.
//!
//! # Features
//! - wgpu backend for real rendering, dummy backend for headless tests
//! - Mode state machine with fallback to the previous mode on failed entry
//! - Layer stack for input tracing and frame statistics
//! - Free-look camera, wireframe and depth-test toggles

pub mod app;
pub mod backend;
pub mod camera;
pub mod demos;
pub mod error;
pub mod event;
pub mod input;
pub mod keybindings;
pub mod layer;
pub mod mode;
pub mod render_state;
pub mod sandbox;
pub mod shader;
pub mod texture;
pub mod window;

use std::path::PathBuf;

pub use backend::wgpu_backend::WgpuBackend;
pub use backend::DummyBackend;
pub use error::{ModeError, SandboxError, TransitionError};
pub use mode::{DemoMode, ModeId, ModeMachine, ModeRegistry};
pub use sandbox::Sandbox;
pub use window::Window;

/// Configuration for the sandbox application
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Window title prefix
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// Mode entered on startup
    pub start_mode: ModeId,
    /// Root directory for shaders and textures
    pub asset_dir: PathBuf,
    /// Start in wireframe
    pub wireframe: bool,
    /// Start with depth testing enabled
    pub depth_test: bool,
    /// Exit after this many frames
    pub max_frames: Option<u64>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            title: "Sparky Sandbox".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            start_mode: ModeId(1),
            asset_dir: PathBuf::from("assets"),
            wireframe: true,
            depth_test: false,
            max_frames: None,
        }
    }
}
