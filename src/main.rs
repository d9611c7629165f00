use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use demo_sandbox::{ModeId, SandboxConfig};

/// Demo sandbox arguments.
#[derive(Parser, Debug)]
#[command(
    name = "demo-sandbox",
    about = "Real-time rendering sandbox with switchable demo modes",
    long_about = "Steps through numbered demo scenes.\n\n\
        KEYS:\n\
        \n\
        • Right / PageDown: next mode, Left / PageUp: previous mode\n\
        • 1-9: jump to mode\n\
        • P: toggle wireframe, Z: toggle depth test\n\
        • L: toggle free look (WASD + mouse)\n\
        • Escape: quit\n\
        \n\
        Set RUST_LOG=debug for frame statistics.",
    version
)]
struct Args {
    /// Mode entered on startup.
    #[arg(long, default_value = "1")]
    mode: u32,

    /// Initial window width in pixels.
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in pixels.
    #[arg(long, default_value = "720")]
    height: u32,

    /// Disable vertical sync (may cause tearing).
    #[arg(long)]
    no_vsync: bool,

    /// Directory containing shaders/ and textures/.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Start with filled polygons instead of wireframe.
    #[arg(long)]
    fill: bool,

    /// Start with depth testing enabled.
    #[arg(long)]
    depth_test: bool,

    /// Exit after rendering N frames (useful for testing).
    #[arg(long)]
    max_frames: Option<u64>,
}

impl From<Args> for SandboxConfig {
    fn from(args: Args) -> Self {
        Self {
            width: args.width,
            height: args.height,
            vsync: !args.no_vsync,
            start_mode: ModeId(args.mode),
            asset_dir: args.assets,
            wireframe: !args.fill,
            depth_test: args.depth_test,
            max_frames: args.max_frames,
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SandboxConfig::from(Args::parse());
    log::info!("Starting demo sandbox (assets: {})", config.asset_dir.display());

    match demo_sandbox::app::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
