//! Shader program loading.
//!
//! A program is a vertex and a fragment WGSL file. Both are read from disk
//! and run through naga's WGSL front end and validator before anything is
//! handed to the backend, so broken shaders fail with a readable message
//! instead of a device error.

use std::path::{Path, PathBuf};

use crate::error::ShaderError;

/// Entry point every vertex shader must export
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point every fragment shader must export
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Validated WGSL sources for one program
#[derive(Debug, Clone)]
pub struct ProgramSource {
    pub vertex_path: PathBuf,
    pub fragment_path: PathBuf,
    pub vertex: String,
    pub fragment: String,
}

/// Read and validate a vertex/fragment pair.
pub fn load_program_sources(
    vertex_path: impl AsRef<Path>,
    fragment_path: impl AsRef<Path>,
) -> Result<ProgramSource, ShaderError> {
    let vertex_path = vertex_path.as_ref();
    let fragment_path = fragment_path.as_ref();

    let vertex = read_source(vertex_path)?;
    validate_wgsl(vertex_path, &vertex, naga::ShaderStage::Vertex)?;

    let fragment = read_source(fragment_path)?;
    validate_wgsl(fragment_path, &fragment, naga::ShaderStage::Fragment)?;

    log::debug!(
        "Loaded program {} + {}",
        vertex_path.display(),
        fragment_path.display()
    );

    Ok(ProgramSource {
        vertex_path: vertex_path.to_path_buf(),
        fragment_path: fragment_path.to_path_buf(),
        vertex,
        fragment,
    })
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse and validate a WGSL module and check it exports the entry point for `stage`.
pub fn validate_wgsl(
    path: &Path,
    source: &str,
    stage: naga::ShaderStage,
) -> Result<(), ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Parse {
        path: path.to_path_buf(),
        message: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            path: path.to_path_buf(),
            message: e.emit_to_string(source),
        })?;

    let (stage_name, entry) = match stage {
        naga::ShaderStage::Vertex => ("vertex", VERTEX_ENTRY),
        naga::ShaderStage::Fragment => ("fragment", FRAGMENT_ENTRY),
        naga::ShaderStage::Compute => ("compute", "cs_main"),
    };

    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage && ep.name == entry);
    if !found {
        return Err(ShaderError::MissingEntryPoint {
            path: path.to_path_buf(),
            stage: stage_name,
            entry,
        });
    }

    Ok(())
}
