//! Demo modes and their lifecycle.
//!
//! A mode is one numbered demo scene. Modes are built fresh from the
//! [`ModeRegistry`] every time they are entered, create all of their GPU
//! objects through a [`SetupContext`] (which records them in the mode's
//! [`ResourceScope`]), draw through a [`FrameContext`] once per frame, and
//! lose every recorded object when the [`ModeMachine`] leaves them.

pub mod machine;
pub mod registry;
pub mod scope;

use std::fmt;
use std::path::{Path, PathBuf};

use bytemuck::Pod;
use glam::Vec2;

use crate::backend::*;
use crate::camera::{CameraSettings, FlyCamera};
use crate::error::ModeError;
use crate::input::InputState;
use crate::shader;
use crate::texture::{GpuTexture, TextureData};

pub use machine::{MachineState, ModeMachine};
pub use registry::ModeRegistry;
pub use scope::ResourceScope;

/// Identifier of a registered mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModeId(pub u32);

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ModeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// One demo scene
pub trait DemoMode {
    /// Build geometry, programs and static uniforms.
    ///
    /// Every GPU object must be created through `ctx` so it is released when
    /// the mode is left. Returning an error aborts entry.
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError>;

    /// Update dynamic uniforms and issue draws. The main pass is already open.
    fn frame(&mut self, ctx: &mut FrameContext<'_>);

    /// Called once when the mode is left, before its resources are released
    fn teardown(&mut self) {}

    /// Colour the main pass is cleared to
    fn clear_color(&self) -> [f32; 4] {
        [0.1, 0.1, 0.1, 1.0]
    }

    /// Free-look camera tuning for this mode
    fn camera_settings(&self) -> CameraSettings {
        CameraSettings::default()
    }
}

/// Fixed-function state of a program
#[derive(Debug, Clone)]
pub struct ProgramLayout {
    pub label: Option<String>,
    pub vertex_layouts: Vec<VertexBufferLayout>,
    pub bind_group_layouts: Vec<BindGroupLayoutHandle>,
    pub topology: PrimitiveTopology,
    pub front_face: FrontFace,
    pub cull_mode: CullMode,
}

impl Default for ProgramLayout {
    fn default() -> Self {
        Self {
            label: None,
            vertex_layouts: Vec::new(),
            bind_group_layouts: Vec::new(),
            topology: PrimitiveTopology::TriangleList,
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::None,
        }
    }
}

/// A uniform buffer bound at binding 0 of its own bind group
#[derive(Debug, Clone, Copy)]
pub struct UniformBinding {
    pub buffer: BufferHandle,
    pub layout: BindGroupLayoutHandle,
    pub bind_group: BindGroupHandle,
}

/// Resource creation during mode entry. Everything created here is tracked.
pub struct SetupContext<'a> {
    gpu: &'a mut dyn GraphicsBackend,
    scope: &'a mut ResourceScope,
    assets: &'a Path,
}

impl<'a> SetupContext<'a> {
    pub fn new(
        gpu: &'a mut dyn GraphicsBackend,
        scope: &'a mut ResourceScope,
        assets: &'a Path,
    ) -> Self {
        Self { gpu, scope, assets }
    }

    /// Resolve a path relative to the asset root
    pub fn asset_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets.join(relative)
    }

    pub fn swapchain_format(&self) -> TextureFormat {
        self.gpu.swapchain_format()
    }

    /// Current surface size in pixels
    pub fn viewport(&self) -> (u32, u32) {
        self.gpu.surface_size()
    }

    fn buffer_with(
        &mut self,
        label: &str,
        usage: BufferUsage,
        bytes: &[u8],
    ) -> Result<BufferHandle, ModeError> {
        let handle = self.gpu.create_buffer_init(
            &BufferDescriptor {
                label: Some(label.to_string()),
                size: bytes.len() as u64,
                usage,
            },
            bytes,
        )?;
        self.scope.track(ResourceHandle::Buffer(handle));
        Ok(handle)
    }

    pub fn vertex_buffer<T: Pod>(&mut self, label: &str, vertices: &[T]) -> Result<BufferHandle, ModeError> {
        self.buffer_with(label, BufferUsage::VERTEX, bytemuck::cast_slice(vertices))
    }

    pub fn index_buffer<T: Pod>(&mut self, label: &str, indices: &[T]) -> Result<BufferHandle, ModeError> {
        self.buffer_with(label, BufferUsage::INDEX, bytemuck::cast_slice(indices))
    }

    /// Uniform buffer initialised with `value`, writable every frame
    pub fn uniform_buffer<T: Pod>(&mut self, label: &str, value: &T) -> Result<BufferHandle, ModeError> {
        self.buffer_with(
            label,
            BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            bytemuck::bytes_of(value),
        )
    }

    pub fn bind_group_layout(
        &mut self,
        entries: &[BindGroupLayoutEntry],
    ) -> Result<BindGroupLayoutHandle, ModeError> {
        let handle = self.gpu.create_bind_group_layout(entries)?;
        self.scope.track(ResourceHandle::BindGroupLayout(handle));
        Ok(handle)
    }

    pub fn bind_group(
        &mut self,
        layout: BindGroupLayoutHandle,
        entries: &[(u32, BindGroupEntry)],
    ) -> Result<BindGroupHandle, ModeError> {
        let handle = self.gpu.create_bind_group(layout, entries)?;
        self.scope.track(ResourceHandle::BindGroup(handle));
        Ok(handle)
    }

    /// Layout, buffer and bind group for a single uniform at binding 0
    pub fn uniform_bind_group<T: Pod>(
        &mut self,
        label: &str,
        value: &T,
        visibility: ShaderStageFlags,
    ) -> Result<UniformBinding, ModeError> {
        let layout = self.bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: BindingType::UniformBuffer,
        }])?;
        let buffer = self.uniform_buffer(label, value)?;
        let bind_group = self.bind_group(
            layout,
            &[(
                0,
                BindGroupEntry::Buffer {
                    buffer,
                    offset: 0,
                    size: None,
                },
            )],
        )?;
        Ok(UniformBinding {
            buffer,
            layout,
            bind_group,
        })
    }

    /// Load, validate and link a vertex/fragment pair from the asset root
    pub fn program(
        &mut self,
        vertex: &str,
        fragment: &str,
        layout: ProgramLayout,
    ) -> Result<RenderPipelineHandle, ModeError> {
        let sources =
            shader::load_program_sources(self.asset_path(vertex), self.asset_path(fragment))?;

        let handle = self.gpu.create_render_pipeline(&RenderPipelineDescriptor {
            label: layout.label.or_else(|| Some(format!("{} + {}", vertex, fragment))),
            vertex_shader: sources.vertex,
            fragment_shader: sources.fragment,
            vertex_layouts: layout.vertex_layouts,
            bind_group_layouts: layout.bind_group_layouts,
            primitive_topology: layout.topology,
            front_face: layout.front_face,
            cull_mode: layout.cull_mode,
        })?;
        self.scope.track(ResourceHandle::RenderPipeline(handle));
        Ok(handle)
    }

    /// Upload decoded pixels as a sampled texture
    pub fn texture_rgba(&mut self, data: &TextureData) -> Result<GpuTexture, ModeError> {
        let handle = self.gpu.create_texture(&TextureDescriptor {
            label: Some(data.name.clone()),
            width: data.width,
            height: data.height,
            format: data.format,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;
        self.scope.track(ResourceHandle::Texture(handle));

        let view = self.gpu.create_texture_view(handle)?;
        self.scope.track(ResourceHandle::TextureView(view));

        self.gpu.write_texture(handle, &data.data, data.width, data.height);

        Ok(GpuTexture {
            handle,
            view,
            width: data.width,
            height: data.height,
        })
    }

    /// Decode an image from the asset root and upload it
    pub fn texture_from_file(&mut self, relative: &str) -> Result<GpuTexture, ModeError> {
        let data = TextureData::from_file(self.asset_path(relative))?;
        self.texture_rgba(&data)
    }

    pub fn sampler(&mut self, desc: &SamplerDescriptor) -> Result<SamplerHandle, ModeError> {
        let handle = self.gpu.create_sampler(desc)?;
        self.scope.track(ResourceHandle::Sampler(handle));
        Ok(handle)
    }
}

/// Per-frame state handed to the active mode
pub struct FrameContext<'a> {
    pub gpu: &'a mut dyn GraphicsBackend,
    /// Seconds since the mode was entered
    pub time: f32,
    /// Seconds since the previous frame
    pub dt: f32,
    /// Cursor position in window pixels
    pub cursor: Vec2,
    pub viewport: (u32, u32),
    pub camera: &'a FlyCamera,
    pub input: &'a InputState,
}

impl<'a> FrameContext<'a> {
    pub fn aspect(&self) -> f32 {
        let (width, height) = self.viewport;
        width.max(1) as f32 / height.max(1) as f32
    }

    /// Overwrite a uniform buffer with `value`
    pub fn write_uniform<T: Pod>(&mut self, buffer: BufferHandle, value: &T) {
        self.gpu.write_buffer(buffer, 0, bytemuck::bytes_of(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_bind_group_tracks_three_objects() {
        let mut gpu = DummyBackend::new();
        let mut scope = ResourceScope::new(ModeId(1));
        {
            let mut ctx = SetupContext::new(&mut gpu, &mut scope, Path::new("assets"));
            ctx.uniform_bind_group("u", &[0.0f32; 4], ShaderStageFlags::VERTEX)
                .unwrap();
        }
        assert_eq!(scope.len(), 3);
        assert_eq!(gpu.live_resources().total(), 3);
        scope.release(&mut gpu);
        assert_eq!(gpu.live_resources().total(), 0);
    }

    #[test]
    fn test_texture_rgba_tracks_texture_and_view() {
        let mut gpu = DummyBackend::new();
        let mut scope = ResourceScope::new(ModeId(7));
        let data = TextureData::checkerboard(8, 2, [255; 4], [0; 4]);
        let texture = SetupContext::new(&mut gpu, &mut scope, Path::new("assets"))
            .texture_rgba(&data)
            .unwrap();
        assert_eq!(texture.width, 8);
        assert_eq!(scope.len(), 2);
        scope.release(&mut gpu);
    }

    #[test]
    fn test_program_with_missing_file_creates_nothing() {
        let mut gpu = DummyBackend::new();
        let mut scope = ResourceScope::new(ModeId(2));
        let err = SetupContext::new(&mut gpu, &mut scope, Path::new("no-such-dir"))
            .program("a.vert.wgsl", "a.frag.wgsl", ProgramLayout::default())
            .unwrap_err();
        assert!(matches!(err, ModeError::Shader(_)));
        assert!(scope.is_empty());
        assert_eq!(gpu.live_resources().render_pipelines, 0);
    }

    #[test]
    fn test_frame_context_aspect() {
        let mut gpu = DummyBackend::new();
        let camera = FlyCamera::default();
        let input = InputState::default();
        let ctx = FrameContext {
            gpu: &mut gpu,
            time: 0.0,
            dt: 0.0,
            cursor: Vec2::ZERO,
            viewport: (1600, 900),
            camera: &camera,
            input: &input,
        };
        assert!((ctx.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }
}
