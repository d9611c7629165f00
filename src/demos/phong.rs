//! Phong-lit cube with a small emissive cube marking an orbiting light.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::backend::{
    BindGroupEntry, BindGroupHandle, BindGroupLayoutEntry, BindingType, BufferHandle, CullMode,
    RenderPipelineHandle, ShaderStageFlags,
};
use crate::camera::CameraSettings;
use crate::demos::common::{cube_with_normals, NormalVertex};
use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, ProgramLayout, SetupContext, UniformBinding};

const CUBE_VERTEX_COUNT: u32 = 36;
const OBJECT_COLOR: [f32; 4] = [1.0, 0.5, 0.31, 1.0];
const LIGHT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    light_pos: [f32; 4],
    view_pos: [f32; 4],
    light_color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl ModelUniform {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Model {
    buffer: BufferHandle,
    bind_group: BindGroupHandle,
}

#[derive(Debug, Clone, Copy)]
struct Resources {
    lit: RenderPipelineHandle,
    lamp: RenderPipelineHandle,
    vertices: BufferHandle,
    scene: UniformBinding,
    object: Model,
    light: Model,
}

/// Light orbit in the XZ plane
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub radius: f32,
    pub height: f32,
    /// Radians per second
    pub speed: f32,
}

impl Orbit {
    pub fn position(&self, time: f32) -> Vec3 {
        let angle = time * self.speed;
        Vec3::new(angle.cos() * self.radius, self.height, angle.sin() * self.radius)
    }
}

#[derive(Debug)]
pub struct PhongLighting {
    orbit: Orbit,
    resources: Option<Resources>,
}

impl Default for PhongLighting {
    fn default() -> Self {
        Self {
            orbit: Orbit {
                radius: 2.0,
                height: 1.0,
                speed: 0.8,
            },
            resources: None,
        }
    }
}

impl DemoMode for PhongLighting {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        let vertices = ctx.vertex_buffer("Phong Cube", &cube_with_normals())?;
        let scene = ctx.uniform_bind_group(
            "Phong Scene",
            &SceneUniform::zeroed(),
            ShaderStageFlags::VERTEX_FRAGMENT,
        )?;

        let model_layout = ctx.bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::VERTEX_FRAGMENT,
            ty: BindingType::UniformBuffer,
        }])?;
        let mut model = |label: &str, color: [f32; 4]| -> Result<Model, ModeError> {
            let buffer = ctx.uniform_buffer(label, &ModelUniform::new(Mat4::IDENTITY, color))?;
            let bind_group = ctx.bind_group(
                model_layout,
                &[(0, BindGroupEntry::Buffer { buffer, offset: 0, size: None })],
            )?;
            Ok(Model { buffer, bind_group })
        };
        let object = model("Phong Object", OBJECT_COLOR)?;
        let light = model("Phong Light", LIGHT_COLOR)?;

        let layout = ProgramLayout {
            vertex_layouts: vec![NormalVertex::layout()],
            bind_group_layouts: vec![scene.layout, model_layout],
            cull_mode: CullMode::Back,
            ..Default::default()
        };
        let lit = ctx.program(
            "shaders/phong.vert.wgsl",
            "shaders/phong.frag.wgsl",
            ProgramLayout {
                label: Some("Phong Lit".into()),
                ..layout.clone()
            },
        )?;
        let lamp = ctx.program(
            "shaders/phong.vert.wgsl",
            "shaders/light-cube.frag.wgsl",
            ProgramLayout {
                label: Some("Phong Lamp".into()),
                ..layout
            },
        )?;

        self.resources = Some(Resources {
            lit,
            lamp,
            vertices,
            scene,
            object,
            light,
        });
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        let Some(res) = self.resources else {
            return;
        };

        let light_pos = self.orbit.position(ctx.time);
        let view_proj = ctx.camera.projection_matrix(ctx.aspect()) * ctx.camera.view_matrix();
        let scene = SceneUniform {
            view_proj: view_proj.to_cols_array_2d(),
            light_pos: light_pos.extend(1.0).to_array(),
            view_pos: ctx.camera.position.extend(1.0).to_array(),
            light_color: LIGHT_COLOR,
        };
        let object = Mat4::from_rotation_y(ctx.time * 0.3);
        let lamp = Mat4::from_translation(light_pos) * Mat4::from_scale(Vec3::splat(0.2));

        ctx.write_uniform(res.scene.buffer, &scene);
        ctx.write_uniform(res.object.buffer, &ModelUniform::new(object, OBJECT_COLOR));
        ctx.write_uniform(res.light.buffer, &ModelUniform::new(lamp, LIGHT_COLOR));

        ctx.gpu.set_vertex_buffer(0, res.vertices, 0);
        ctx.gpu.set_bind_group(0, res.scene.bind_group);
        for (pipeline, model) in [(res.lit, res.object), (res.lamp, res.light)] {
            ctx.gpu.set_render_pipeline(pipeline);
            ctx.gpu.set_bind_group(1, model.bind_group);
            ctx.gpu.draw(0..CUBE_VERTEX_COUNT, 0..1);
        }
    }

    fn clear_color(&self) -> [f32; 4] {
        [0.05, 0.05, 0.08, 1.0]
    }

    fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            position: Vec3::new(0.0, 1.0, 5.0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_keeps_radius_and_height() {
        let orbit = Orbit {
            radius: 2.0,
            height: 1.0,
            speed: 0.8,
        };
        for step in 0..16 {
            let p = orbit.position(step as f32 * 0.4);
            assert!((Vec3::new(p.x, 0.0, p.z).length() - 2.0).abs() < 1e-5);
            assert_eq!(p.y, 1.0);
        }
    }

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 112);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 80);
    }
}
