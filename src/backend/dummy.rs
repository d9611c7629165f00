//! Dummy GPU backend for testing and headless runs.
//!
//! This backend doesn't perform actual GPU operations. It hands out handles,
//! keeps track of which ones are still alive, and records every command
//! issued against it so tests can inspect what a frame did.

use std::collections::HashSet;
use std::ops::Range;

use crate::backend::traits::*;
use crate::backend::types::*;

/// Resource kinds, used to inject creation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    Texture,
    TextureView,
    Sampler,
    BindGroupLayout,
    BindGroup,
    RenderPipeline,
}

/// A command recorded by the dummy backend
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    BeginFrame(u64),
    EndFrame(u64),
    BeginPass { clear_color: [f32; 4] },
    EndPass,
    SetRasterState(RasterState),
    SetPipeline(RenderPipelineHandle),
    SetBindGroup { index: u32, bind_group: BindGroupHandle },
    SetVertexBuffer { slot: u32, buffer: BufferHandle },
    SetIndexBuffer { buffer: BufferHandle, format: IndexFormat },
    WriteBuffer { buffer: BufferHandle, len: usize },
    Draw { vertices: Range<u32>, instances: Range<u32>, pipeline: Option<RenderPipelineHandle> },
    DrawIndexed { indices: Range<u32>, instances: Range<u32>, pipeline: Option<RenderPipelineHandle> },
}

/// Dummy GPU backend.
#[derive(Debug)]
pub struct DummyBackend {
    width: u32,
    height: u32,
    wireframe_supported: bool,
    next_id: u64,
    frame_index: u64,
    in_frame: bool,
    in_pass: bool,
    bound_pipeline: Option<RenderPipelineHandle>,

    buffers: HashSet<u64>,
    textures: HashSet<u64>,
    texture_views: HashSet<u64>,
    samplers: HashSet<u64>,
    bind_group_layouts: HashSet<u64>,
    bind_groups: HashSet<u64>,
    render_pipelines: HashSet<u64>,

    fail_next: Option<ResourceKind>,
    invalid_destroys: usize,
    invalid_draws: usize,
    commands: Vec<RecordedCommand>,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::with_size(1280, 720)
    }

    /// Create a dummy backend with a specific surface size.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            wireframe_supported: true,
            next_id: 1,
            frame_index: 0,
            in_frame: false,
            in_pass: false,
            bound_pipeline: None,
            buffers: HashSet::new(),
            textures: HashSet::new(),
            texture_views: HashSet::new(),
            samplers: HashSet::new(),
            bind_group_layouts: HashSet::new(),
            bind_groups: HashSet::new(),
            render_pipelines: HashSet::new(),
            fail_next: None,
            invalid_destroys: 0,
            invalid_draws: 0,
            commands: Vec::new(),
        }
    }

    /// Pretend the device lacks line polygon mode support.
    pub fn without_wireframe(mut self) -> Self {
        self.wireframe_supported = false;
        self
    }

    /// Make the next creation of the given kind fail.
    pub fn fail_next(&mut self, kind: ResourceKind) {
        self.fail_next = Some(kind);
    }

    /// All commands recorded so far.
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Draw commands recorded so far (indexed and non-indexed).
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::Draw { .. } | RecordedCommand::DrawIndexed { .. }))
            .count()
    }

    /// Pipelines referenced by recorded draw calls.
    pub fn drawn_pipelines(&self) -> Vec<RenderPipelineHandle> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::Draw { pipeline, .. }
                | RecordedCommand::DrawIndexed { pipeline, .. } => *pipeline,
                _ => None,
            })
            .collect()
    }

    /// Raster states set so far, in order.
    pub fn raster_states(&self) -> Vec<RasterState> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::SetRasterState(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// Number of frames presented.
    pub fn frames_presented(&self) -> u64 {
        self.frame_index
    }

    /// Destroy calls on handles that were not alive.
    pub fn invalid_destroys(&self) -> usize {
        self.invalid_destroys
    }

    /// Draw calls issued without a live pipeline bound.
    pub fn invalid_draws(&self) -> usize {
        self.invalid_draws
    }

    fn allocate(&mut self, kind: ResourceKind, label: Option<&str>) -> BackendResult<u64> {
        if self.fail_next == Some(kind) {
            self.fail_next = None;
            let message = format!("injected failure for {:?} {:?}", kind, label);
            return Err(match kind {
                ResourceKind::Buffer => BackendError::BufferCreationFailed(message),
                ResourceKind::Texture | ResourceKind::TextureView => {
                    BackendError::TextureCreationFailed(message)
                }
                ResourceKind::Sampler => BackendError::SamplerCreationFailed(message),
                ResourceKind::BindGroupLayout | ResourceKind::BindGroup => {
                    BackendError::BindGroupCreationFailed(message)
                }
                ResourceKind::RenderPipeline => BackendError::PipelineCreationFailed(message),
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        log::trace!("DummyBackend: creating {:?} #{} {:?}", kind, id, label);

        let set = self.set_mut(kind);
        set.insert(id);
        Ok(id)
    }

    fn release(&mut self, kind: ResourceKind, id: u64) {
        if self.set_mut(kind).remove(&id) {
            log::trace!("DummyBackend: destroyed {:?} #{}", kind, id);
        } else {
            log::warn!("DummyBackend: destroy of unknown {:?} #{}", kind, id);
            self.invalid_destroys += 1;
        }
    }

    fn set_mut(&mut self, kind: ResourceKind) -> &mut HashSet<u64> {
        match kind {
            ResourceKind::Buffer => &mut self.buffers,
            ResourceKind::Texture => &mut self.textures,
            ResourceKind::TextureView => &mut self.texture_views,
            ResourceKind::Sampler => &mut self.samplers,
            ResourceKind::BindGroupLayout => &mut self.bind_group_layouts,
            ResourceKind::BindGroup => &mut self.bind_groups,
            ResourceKind::RenderPipeline => &mut self.render_pipelines,
        }
    }

    fn record(&mut self, command: RecordedCommand) {
        if self.in_pass {
            self.commands.push(command);
        } else {
            log::warn!("DummyBackend: {:?} recorded outside of a render pass", command);
        }
    }

    fn check_draw(&mut self) -> Option<RenderPipelineHandle> {
        let pipeline = self.bound_pipeline;
        match pipeline {
            Some(p) if self.render_pipelines.contains(&p.0) => {}
            _ => self.invalid_draws += 1,
        }
        pipeline
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn supports_wireframe(&self) -> bool {
        self.wireframe_supported
    }

    fn begin_frame(&mut self) -> BackendResult<FrameInfo> {
        self.in_frame = true;
        self.commands.push(RecordedCommand::BeginFrame(self.frame_index));
        Ok(FrameInfo {
            index: self.frame_index,
            width: self.width,
            height: self.height,
        })
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        if self.in_frame {
            self.commands.push(RecordedCommand::EndFrame(self.frame_index));
            self.frame_index += 1;
            self.in_frame = false;
        }
        Ok(())
    }

    fn swapchain_format(&self) -> TextureFormat {
        TextureFormat::Bgra8UnormSrgb
    }

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
        self.allocate(ResourceKind::Buffer, desc.label.as_deref())
            .map(BufferHandle)
    }

    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        if data.len() as u64 > desc.size {
            return Err(BackendError::BufferCreationFailed(format!(
                "{:?}: {} bytes do not fit in {} bytes",
                desc.label,
                data.len(),
                desc.size
            )));
        }
        self.create_buffer(desc)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, _offset: u64, data: &[u8]) {
        if self.buffers.contains(&buffer.0) {
            self.commands.push(RecordedCommand::WriteBuffer {
                buffer,
                len: data.len(),
            });
        } else {
            log::warn!("DummyBackend: write to unknown buffer #{}", buffer.0);
        }
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "{:?}: zero sized texture",
                desc.label
            )));
        }
        self.allocate(ResourceKind::Texture, desc.label.as_deref())
            .map(TextureHandle)
    }

    fn create_texture_view(&mut self, texture: TextureHandle) -> BackendResult<TextureViewHandle> {
        if !self.textures.contains(&texture.0) {
            return Err(BackendError::TextureCreationFailed("Texture not found".into()));
        }
        self.allocate(ResourceKind::TextureView, None)
            .map(TextureViewHandle)
    }

    fn write_texture(&mut self, texture: TextureHandle, data: &[u8], width: u32, height: u32) {
        log::trace!(
            "DummyBackend: write_texture #{} ({}x{}) len={}",
            texture.0,
            width,
            height,
            data.len()
        );
    }

    fn create_sampler(&mut self, desc: &SamplerDescriptor) -> BackendResult<SamplerHandle> {
        self.allocate(ResourceKind::Sampler, desc.label.as_deref())
            .map(SamplerHandle)
    }

    fn create_bind_group_layout(
        &mut self,
        _entries: &[BindGroupLayoutEntry],
    ) -> BackendResult<BindGroupLayoutHandle> {
        self.allocate(ResourceKind::BindGroupLayout, None)
            .map(BindGroupLayoutHandle)
    }

    fn create_bind_group(
        &mut self,
        layout: BindGroupLayoutHandle,
        _entries: &[(u32, BindGroupEntry)],
    ) -> BackendResult<BindGroupHandle> {
        if !self.bind_group_layouts.contains(&layout.0) {
            return Err(BackendError::BindGroupCreationFailed("Layout not found".into()));
        }
        self.allocate(ResourceKind::BindGroup, None)
            .map(BindGroupHandle)
    }

    fn create_render_pipeline(
        &mut self,
        desc: &RenderPipelineDescriptor,
    ) -> BackendResult<RenderPipelineHandle> {
        if let Some(missing) = desc
            .bind_group_layouts
            .iter()
            .find(|l| !self.bind_group_layouts.contains(&l.0))
        {
            return Err(BackendError::PipelineCreationFailed(format!(
                "bind group layout #{} not found",
                missing.0
            )));
        }
        self.allocate(ResourceKind::RenderPipeline, desc.label.as_deref())
            .map(RenderPipelineHandle)
    }

    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) {
        self.in_pass = true;
        self.bound_pipeline = None;
        self.commands.push(RecordedCommand::BeginPass {
            clear_color: desc.clear_color,
        });
    }

    fn end_render_pass(&mut self) {
        if self.in_pass {
            self.commands.push(RecordedCommand::EndPass);
        }
        self.in_pass = false;
        self.bound_pipeline = None;
    }

    fn set_raster_state(&mut self, state: RasterState) {
        self.record(RecordedCommand::SetRasterState(state));
    }

    fn set_render_pipeline(&mut self, pipeline: RenderPipelineHandle) {
        self.bound_pipeline = Some(pipeline);
        self.record(RecordedCommand::SetPipeline(pipeline));
    }

    fn set_bind_group(&mut self, index: u32, bind_group: BindGroupHandle) {
        self.record(RecordedCommand::SetBindGroup { index, bind_group });
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, _offset: u64) {
        self.record(RecordedCommand::SetVertexBuffer { slot, buffer });
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, _offset: u64, format: IndexFormat) {
        self.record(RecordedCommand::SetIndexBuffer { buffer, format });
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        let pipeline = self.check_draw();
        self.record(RecordedCommand::Draw {
            vertices,
            instances,
            pipeline,
        });
    }

    fn draw_indexed(&mut self, indices: Range<u32>, _base_vertex: i32, instances: Range<u32>) {
        let pipeline = self.check_draw();
        self.record(RecordedCommand::DrawIndexed {
            indices,
            instances,
            pipeline,
        });
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.release(ResourceKind::Buffer, buffer.0);
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.release(ResourceKind::Texture, texture.0);
    }

    fn destroy_texture_view(&mut self, view: TextureViewHandle) {
        self.release(ResourceKind::TextureView, view.0);
    }

    fn destroy_sampler(&mut self, sampler: SamplerHandle) {
        self.release(ResourceKind::Sampler, sampler.0);
    }

    fn destroy_bind_group_layout(&mut self, layout: BindGroupLayoutHandle) {
        self.release(ResourceKind::BindGroupLayout, layout.0);
    }

    fn destroy_bind_group(&mut self, bind_group: BindGroupHandle) {
        self.release(ResourceKind::BindGroup, bind_group.0);
    }

    fn destroy_render_pipeline(&mut self, pipeline: RenderPipelineHandle) {
        self.release(ResourceKind::RenderPipeline, pipeline.0);
    }

    fn live_resources(&self) -> ResourceCounts {
        ResourceCounts {
            buffers: self.buffers.len(),
            textures: self.textures.len(),
            texture_views: self.texture_views.len(),
            samplers: self.samplers.len(),
            bind_group_layouts: self.bind_group_layouts.len(),
            bind_groups: self.bind_groups.len(),
            render_pipelines: self.render_pipelines.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_desc() -> BufferDescriptor {
        BufferDescriptor {
            label: Some("test".into()),
            size: 64,
            usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
        }
    }

    #[test]
    fn test_dummy_backend() {
        let backend = DummyBackend::new();
        assert_eq!(backend.name(), "Dummy");
        assert_eq!(backend.surface_size(), (1280, 720));
        assert_eq!(backend.live_resources().total(), 0);
    }

    #[test]
    fn test_create_and_destroy_tracks_live_resources() {
        let mut backend = DummyBackend::new();
        let buffer = backend.create_buffer(&uniform_desc()).unwrap();
        let layout = backend.create_bind_group_layout(&[]).unwrap();
        assert_eq!(backend.live_resources().total(), 2);

        backend.destroy(ResourceHandle::Buffer(buffer));
        backend.destroy(ResourceHandle::BindGroupLayout(layout));
        assert_eq!(backend.live_resources().total(), 0);
        assert_eq!(backend.invalid_destroys(), 0);
    }

    #[test]
    fn test_double_destroy_is_reported() {
        let mut backend = DummyBackend::new();
        let buffer = backend.create_buffer(&uniform_desc()).unwrap();
        backend.destroy_buffer(buffer);
        backend.destroy_buffer(buffer);
        assert_eq!(backend.invalid_destroys(), 1);
    }

    #[test]
    fn test_injected_failure_only_hits_once() {
        let mut backend = DummyBackend::new();
        backend.fail_next(ResourceKind::Buffer);
        assert!(matches!(
            backend.create_buffer(&uniform_desc()),
            Err(BackendError::BufferCreationFailed(_))
        ));
        assert!(backend.create_buffer(&uniform_desc()).is_ok());
    }

    #[test]
    fn test_draw_without_pipeline_is_invalid() {
        let mut backend = DummyBackend::new();
        backend.begin_frame().unwrap();
        backend.begin_render_pass(&RenderPassDescriptor {
            label: None,
            clear_color: [0.0; 4],
            clear_depth: 1.0,
        });
        backend.draw(0..3, 0..1);
        backend.end_render_pass();
        backend.end_frame().unwrap();

        assert_eq!(backend.draw_count(), 1);
        assert_eq!(backend.invalid_draws(), 1);
        assert_eq!(backend.frames_presented(), 1);
    }
}
