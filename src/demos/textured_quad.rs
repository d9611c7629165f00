//! Textured quads: one loaded from disk, one generated and spun around Z

use glam::{Mat4, Vec3};

use crate::backend::{
    BindGroupEntry, BindGroupHandle, BindGroupLayoutEntry, BindingType, BufferHandle, FilterMode,
    RenderPipelineHandle, SamplerDescriptor, ShaderStageFlags,
};
use crate::demos::common::{draw_indexed_mesh, textured_quad, TexturedVertex, TransformUniform, QUAD_INDICES};
use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, ProgramLayout, SetupContext, UniformBinding};
use crate::texture::{GpuTexture, TextureData};

/// Radians per second
const SPIN_SPEED: f32 = 1.0;

/// Everything needed to draw one textured quad with a transform uniform
#[derive(Debug, Clone, Copy)]
struct QuadResources {
    pipeline: RenderPipelineHandle,
    vertices: BufferHandle,
    indices: BufferHandle,
    transform: UniformBinding,
    material: BindGroupHandle,
}

impl QuadResources {
    fn build(ctx: &mut SetupContext<'_>, texture: GpuTexture, filter: FilterMode) -> Result<Self, ModeError> {
        let vertices = ctx.vertex_buffer("Quad Vertices", &textured_quad(0.5))?;
        let indices = ctx.index_buffer("Quad Indices", &QUAD_INDICES)?;
        let transform =
            ctx.uniform_bind_group("Quad Transform", &TransformUniform::default(), ShaderStageFlags::VERTEX)?;

        let sampler = ctx.sampler(&SamplerDescriptor {
            label: Some("Quad Sampler".into()),
            mag_filter: filter,
            min_filter: filter,
            ..Default::default()
        })?;
        let material_layout = ctx.bind_group_layout(&[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Texture { filterable: true },
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Sampler,
            },
        ])?;
        let material = ctx.bind_group(
            material_layout,
            &[
                (0, BindGroupEntry::Texture(texture.view)),
                (1, BindGroupEntry::Sampler(sampler)),
            ],
        )?;

        let pipeline = ctx.program(
            "shaders/textured.vert.wgsl",
            "shaders/textured.frag.wgsl",
            ProgramLayout {
                label: Some("Textured Quad".into()),
                vertex_layouts: vec![TexturedVertex::layout()],
                bind_group_layouts: vec![transform.layout, material_layout],
                ..Default::default()
            },
        )?;

        Ok(Self {
            pipeline,
            vertices,
            indices,
            transform,
            material,
        })
    }

    fn draw(&self, ctx: &mut FrameContext<'_>, model: Mat4) {
        ctx.write_uniform(self.transform.buffer, &TransformUniform::new(model));
        ctx.gpu.set_render_pipeline(self.pipeline);
        draw_indexed_mesh(
            ctx.gpu,
            self.vertices,
            self.indices,
            QUAD_INDICES.len() as u32,
            &[self.transform.bind_group, self.material],
        );
    }
}

/// Keeps a quad square on screen regardless of window shape
fn aspect_correction(aspect: f32) -> Mat4 {
    if aspect >= 1.0 {
        Mat4::from_scale(Vec3::new(1.0 / aspect, 1.0, 1.0))
    } else {
        Mat4::from_scale(Vec3::new(1.0, aspect, 1.0))
    }
}

/// Quad textured with an image from the asset directory
#[derive(Debug)]
pub struct TexturedQuad {
    path: String,
    quad: Option<QuadResources>,
}

impl TexturedQuad {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            quad: None,
        }
    }
}

impl Default for TexturedQuad {
    fn default() -> Self {
        Self::new("textures/checker.png")
    }
}

impl DemoMode for TexturedQuad {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        let texture = ctx.texture_from_file(&self.path)?;
        self.quad = Some(QuadResources::build(ctx, texture, FilterMode::Nearest)?);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(quad) = self.quad {
            let model = aspect_correction(ctx.aspect()) * Mat4::from_scale(Vec3::splat(1.5));
            quad.draw(ctx, model);
        }
    }
}

/// Generated checkerboard spinning around the view axis
#[derive(Debug, Default)]
pub struct RotatingQuad {
    quad: Option<QuadResources>,
}

impl DemoMode for RotatingQuad {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        let data = TextureData::checkerboard(256, 32, [240, 200, 60, 255], [40, 40, 60, 255]);
        let texture = ctx.texture_rgba(&data)?;
        self.quad = Some(QuadResources::build(ctx, texture, FilterMode::Linear)?);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(quad) = self.quad {
            let model = aspect_correction(ctx.aspect()) * Mat4::from_rotation_z(ctx.time * SPIN_SPEED);
            quad.draw(ctx, model);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_aspect_correction_keeps_quad_square() {
        let wide = aspect_correction(2.0) * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert_eq!((wide.x, wide.y), (0.5, 1.0));
        let tall = aspect_correction(0.5) * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert_eq!((tall.x, tall.y), (1.0, 0.5));
    }
}
