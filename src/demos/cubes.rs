//! Colour-faced cubes: a single spinning cube seen from a fixed eye, and a
//! field of cubes explored with the free-look camera.
//!
//! Both draw with the same program: group 0 holds the view-projection
//! matrix, group 1 a per-cube model matrix.

use glam::{Mat4, Vec3};

use crate::backend::{
    BindGroupEntry, BindGroupHandle, BindGroupLayoutEntry, BindingType, BufferHandle,
    RenderPipelineHandle, ShaderStageFlags,
};
use crate::camera::CameraSettings;
use crate::demos::common::{colored_cube, ColorVertex, TransformUniform};
use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, ProgramLayout, SetupContext, UniformBinding};

const CUBE_VERTEX_COUNT: u32 = 36;

/// Cube positions in the free-look field
const FIELD: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

#[derive(Debug, Clone, Copy)]
struct CubeModel {
    buffer: BufferHandle,
    bind_group: BindGroupHandle,
}

/// Shared program, mesh and camera uniform plus one model uniform per cube
#[derive(Debug)]
struct CubeScene {
    pipeline: RenderPipelineHandle,
    vertices: BufferHandle,
    camera: UniformBinding,
    models: Vec<CubeModel>,
}

impl CubeScene {
    fn build(ctx: &mut SetupContext<'_>, label: &str, count: usize) -> Result<Self, ModeError> {
        let vertices = ctx.vertex_buffer("Cube Vertices", &colored_cube())?;
        let camera =
            ctx.uniform_bind_group("Cube Camera", &TransformUniform::default(), ShaderStageFlags::VERTEX)?;

        let model_layout = ctx.bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::VERTEX,
            ty: BindingType::UniformBuffer,
        }])?;
        let mut models = Vec::with_capacity(count);
        for _ in 0..count {
            let buffer = ctx.uniform_buffer("Cube Model", &TransformUniform::default())?;
            let bind_group = ctx.bind_group(
                model_layout,
                &[(0, BindGroupEntry::Buffer { buffer, offset: 0, size: None })],
            )?;
            models.push(CubeModel { buffer, bind_group });
        }

        let pipeline = ctx.program(
            "shaders/cube.vert.wgsl",
            "shaders/cube.frag.wgsl",
            ProgramLayout {
                label: Some(label.to_string()),
                vertex_layouts: vec![ColorVertex::layout()],
                bind_group_layouts: vec![camera.layout, model_layout],
                ..Default::default()
            },
        )?;

        Ok(Self {
            pipeline,
            vertices,
            camera,
            models,
        })
    }

    fn draw(&self, ctx: &mut FrameContext<'_>, view_proj: Mat4, transforms: impl IntoIterator<Item = Mat4>) {
        ctx.write_uniform(self.camera.buffer, &TransformUniform::new(view_proj));
        ctx.gpu.set_render_pipeline(self.pipeline);
        ctx.gpu.set_bind_group(0, self.camera.bind_group);
        ctx.gpu.set_vertex_buffer(0, self.vertices, 0);
        for (model, transform) in self.models.iter().zip(transforms) {
            ctx.write_uniform(model.buffer, &TransformUniform::new(transform));
            ctx.gpu.set_bind_group(1, model.bind_group);
            ctx.gpu.draw(0..CUBE_VERTEX_COUNT, 0..1);
        }
    }
}

/// One cube tumbling in front of a fixed eye. Toggle depth testing to see
/// back faces bleed through.
#[derive(Debug, Default)]
pub struct SpinningCube {
    scene: Option<CubeScene>,
}

impl DemoMode for SpinningCube {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        self.scene = Some(CubeScene::build(ctx, "Spinning Cube", 1)?);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        let Some(scene) = &self.scene else {
            return;
        };
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(45f32.to_radians(), ctx.aspect(), 0.1, 100.0);
        let model = Mat4::from_axis_angle(Vec3::new(0.5, 1.0, 0.0).normalize(), ctx.time);
        scene.draw(ctx, proj * view, [model]);
    }

    fn clear_color(&self) -> [f32; 4] {
        [0.2, 0.3, 0.3, 1.0]
    }
}

/// Ten cubes explored with the fly camera (L toggles look-around)
#[derive(Debug, Default)]
pub struct FreeLookCubes {
    scene: Option<CubeScene>,
}

impl FreeLookCubes {
    fn transforms(time: f32) -> impl Iterator<Item = Mat4> {
        FIELD.iter().enumerate().map(move |(i, position)| {
            let angle = (20.0 * i as f32).to_radians() + time * 0.25;
            Mat4::from_translation(Vec3::from(*position))
                * Mat4::from_axis_angle(Vec3::new(1.0, 0.3, 0.5).normalize(), angle)
        })
    }
}

impl DemoMode for FreeLookCubes {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        self.scene = Some(CubeScene::build(ctx, "Free Look Cubes", FIELD.len())?);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        let Some(scene) = &self.scene else {
            return;
        };
        let view_proj = ctx.camera.projection_matrix(ctx.aspect()) * ctx.camera.view_matrix();
        let transforms = Self::transforms(ctx.time);
        scene.draw(ctx, view_proj, transforms);
    }

    fn clear_color(&self) -> [f32; 4] {
        [0.2, 0.3, 0.3, 1.0]
    }

    fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            position: Vec3::new(0.0, 0.0, 6.0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_transforms_place_every_cube() {
        let transforms: Vec<Mat4> = FreeLookCubes::transforms(0.0).collect();
        assert_eq!(transforms.len(), FIELD.len());
        for (transform, position) in transforms.iter().zip(FIELD) {
            let origin = transform.transform_point3(Vec3::ZERO);
            assert!(origin.abs_diff_eq(Vec3::from(position), 1e-5));
        }
    }
}
