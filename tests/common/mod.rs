//! Shared helpers for sandbox integration tests.
//!
//! Everything runs against the dummy backend with the real asset directory,
//! so shader sources are parsed and validated exactly as in a windowed run.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use demo_sandbox::event::EventKind;
use demo_sandbox::{demos, DummyBackend, ModeId, ModeRegistry, Sandbox, SandboxConfig};
use winit::keyboard::KeyCode;

/// Frame time used by every simulated frame
pub const DT: f32 = 1.0 / 60.0;

/// The repository's asset directory
pub fn assets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

pub fn config(start_mode: u32) -> SandboxConfig {
    SandboxConfig {
        start_mode: ModeId(start_mode),
        asset_dir: assets_dir(),
        ..Default::default()
    }
}

/// Sandbox over the bundled demos
pub fn bundled_sandbox(start_mode: u32) -> Sandbox<DummyBackend> {
    sandbox_with(demos::registry(), config(start_mode))
}

pub fn sandbox_with(registry: ModeRegistry, config: SandboxConfig) -> Sandbox<DummyBackend> {
    Sandbox::new(DummyBackend::new(), registry, &config).expect("registry is not empty")
}

pub fn run_frames(sandbox: &mut Sandbox<DummyBackend>, frames: usize) {
    for _ in 0..frames {
        sandbox.frame(DT);
    }
}

/// Press and release a key, then run the frame that applies it
pub fn tap(sandbox: &mut Sandbox<DummyBackend>, key: KeyCode) {
    sandbox.handle_event(EventKind::KeyPressed { key, repeat: false });
    sandbox.handle_event(EventKind::KeyReleased { key });
    sandbox.frame(DT);
}

/// Copy of the asset directory in a fresh temp dir, for tests that break files
pub fn scratch_assets(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("demo-sandbox-{}-{}", name, std::process::id()));
    let shaders = root.join("shaders");
    std::fs::create_dir_all(&shaders).expect("create scratch asset dir");
    for entry in std::fs::read_dir(assets_dir().join("shaders")).expect("read shader dir") {
        let entry = entry.expect("shader dir entry");
        std::fs::copy(entry.path(), shaders.join(entry.file_name())).expect("copy shader");
    }
    root
}
