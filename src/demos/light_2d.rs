//! Three overlapping sprites lit by a point light that follows the cursor.
//!
//! World space is a 16 x 9 orthographic plane with the origin at the bottom
//! left. Each sprite owns its model-matrix uniform so all three draws can be
//! recorded in one pass.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::backend::{
    BindGroupEntry, BindGroupHandle, BindGroupLayoutEntry, BindingType, BufferHandle,
    RenderPipelineHandle, ShaderStageFlags,
};
use crate::demos::common::{draw_indexed_mesh, ColorVertex, TransformUniform, QUAD_INDICES};
use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, ProgramLayout, SetupContext, UniformBinding};

const WORLD_WIDTH: f32 = 16.0;
const WORLD_HEIGHT: f32 = 9.0;

const SPRITES: [([f32; 3], [f32; 4]); 3] = [
    ([0.0, 0.0, 0.0], [0.8, 0.2, 0.3, 1.0]),
    ([4.0, 3.0, 0.0], [0.3, 0.8, 0.2, 1.0]),
    ([8.0, 6.0, 0.0], [0.2, 0.3, 0.8, 1.0]),
];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SceneUniform {
    pr_matrix: [[f32; 4]; 4],
    light_pos: [f32; 2],
    _pad: [f32; 2],
}

impl SceneUniform {
    fn new(light_pos: Vec2) -> Self {
        Self {
            pr_matrix: Mat4::orthographic_rh(0.0, WORLD_WIDTH, 0.0, WORLD_HEIGHT, -1.0, 1.0)
                .to_cols_array_2d(),
            light_pos: light_pos.to_array(),
            _pad: [0.0; 2],
        }
    }
}

/// Map a cursor position in window pixels to world units
pub fn cursor_to_world(cursor: Vec2, viewport: (u32, u32)) -> Vec2 {
    let (width, height) = viewport;
    Vec2::new(
        cursor.x * WORLD_WIDTH / width.max(1) as f32,
        WORLD_HEIGHT - cursor.y * WORLD_HEIGHT / height.max(1) as f32,
    )
}

#[derive(Debug, Default)]
pub struct Light2d {
    pipeline: Option<RenderPipelineHandle>,
    quad: Option<(BufferHandle, BufferHandle)>,
    scene: Option<UniformBinding>,
    sprites: Vec<BindGroupHandle>,
}

impl DemoMode for Light2d {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        // Colour comes from the per-sprite uniform, the vertex colour is white
        let quad = [[0.0, 0.0, 0.0], [8.0, 0.0, 0.0], [8.0, 3.0, 0.0], [0.0, 3.0, 0.0]]
            .map(|position| ColorVertex { position, color: [1.0; 4] });
        let vertices = ctx.vertex_buffer("Sprite Vertices", &quad)?;
        let indices = ctx.index_buffer("Sprite Indices", &QUAD_INDICES)?;

        let scene = ctx.uniform_bind_group(
            "Light Scene",
            &SceneUniform::new(Vec2::new(4.0, 1.5)),
            ShaderStageFlags::VERTEX_FRAGMENT,
        )?;

        let sprite_layout = ctx.bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::VERTEX_FRAGMENT,
            ty: BindingType::UniformBuffer,
        }])?;
        for (translation, color) in SPRITES {
            let buffer =
                ctx.uniform_buffer("Sprite", &SpriteUniform::new(Vec3::from(translation), color))?;
            let bind_group = ctx.bind_group(
                sprite_layout,
                &[(0, BindGroupEntry::Buffer { buffer, offset: 0, size: None })],
            )?;
            self.sprites.push(bind_group);
        }

        let pipeline = ctx.program(
            "shaders/basic.vert.wgsl",
            "shaders/basic.frag.wgsl",
            ProgramLayout {
                label: Some("Simple 2D Light".into()),
                vertex_layouts: vec![ColorVertex::layout()],
                bind_group_layouts: vec![scene.layout, sprite_layout],
                ..Default::default()
            },
        )?;

        self.pipeline = Some(pipeline);
        self.quad = Some((vertices, indices));
        self.scene = Some(scene);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        let (Some(pipeline), Some((vertices, indices)), Some(scene)) =
            (self.pipeline, self.quad, self.scene)
        else {
            return;
        };

        let light = cursor_to_world(ctx.cursor, ctx.viewport);
        ctx.write_uniform(scene.buffer, &SceneUniform::new(light));

        ctx.gpu.set_render_pipeline(pipeline);
        for sprite in &self.sprites {
            draw_indexed_mesh(
                ctx.gpu,
                vertices,
                indices,
                QUAD_INDICES.len() as u32,
                &[scene.bind_group, *sprite],
            );
        }
    }

    fn clear_color(&self) -> [f32; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SpriteUniform {
    ml_matrix: TransformUniform,
    color: [f32; 4],
}

impl SpriteUniform {
    fn new(translation: Vec3, color: [f32; 4]) -> Self {
        Self {
            ml_matrix: TransformUniform::new(Mat4::from_translation(translation)),
            color,
        }
    }
}
