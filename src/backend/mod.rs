//! Backend abstraction layer
//!
//! Provides common traits and types that both the wgpu and the dummy backend implement.

pub mod dummy;
pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use dummy::DummyBackend;
pub use traits::*;
pub use types::*;
