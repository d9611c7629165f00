//! Error types for shader loading, textures, mode transitions and the application shell

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendError;
use crate::mode::ModeId;

/// Errors raised while loading a vertex/fragment program
#[derive(Error, Debug)]
pub enum ShaderError {
    #[error("Failed to read shader {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse shader {path}:\n{message}")]
    Parse { path: PathBuf, message: String },
    #[error("Shader {path} failed validation:\n{message}")]
    Validation { path: PathBuf, message: String },
    #[error("Shader {path} has no {stage} entry point `{entry}`")]
    MissingEntryPoint {
        path: PathBuf,
        stage: &'static str,
        entry: &'static str,
    },
}

/// Errors raised while loading or uploading textures
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Texture data is {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Any failure while a mode builds its resources
#[derive(Error, Debug)]
pub enum ModeError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Reasons a requested mode transition did not happen
#[derive(Error, Debug)]
pub enum TransitionError {
    #[error("No mode registered with id {0}")]
    UnknownMode(ModeId),
    #[error("Sandbox has been shut down")]
    Stopped,
    #[error("Failed to enter mode {mode}: {source}")]
    SetupFailed {
        mode: ModeId,
        #[source]
        source: ModeError,
        /// Mode that was re-entered instead, if any
        fallback: Option<ModeId>,
    },
}

/// Fatal application errors
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("Graphics backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("No demo mode registered")]
    NoModes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_error_from_backend() {
        let err: ModeError = BackendError::OutOfMemory.into();
        assert!(matches!(err, ModeError::Backend(BackendError::OutOfMemory)));
        assert_eq!(err.to_string(), "Out of memory");
    }

    #[test]
    fn test_transition_error_display() {
        let err = TransitionError::UnknownMode(ModeId(999));
        assert_eq!(err.to_string(), "No mode registered with id 999");
    }
}
