use bytemuck::{Pod, Zeroable};

use crate::backend::{BufferHandle, RenderPipelineHandle, ShaderStageFlags};
use crate::demos::common::PositionVertex;
use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, ProgramLayout, SetupContext, UniformBinding};

const VERTICES: [PositionVertex; 3] = [
    PositionVertex { position: [-0.5, -0.5, 0.0] },
    PositionVertex { position: [0.5, -0.5, 0.0] },
    PositionVertex { position: [0.0, 0.5, 0.0] },
];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct TintUniform {
    color: [f32; 4],
}

impl TintUniform {
    /// Green channel oscillates between 0 and 1 once every 2*pi seconds
    fn at(time: f32) -> Self {
        Self {
            color: [0.0, time.sin() * 0.5 + 0.5, 0.0, 1.0],
        }
    }
}

/// Triangle whose colour is driven by a uniform updated every frame
#[derive(Debug, Default)]
pub struct PulsingColor {
    pipeline: Option<RenderPipelineHandle>,
    vertices: Option<BufferHandle>,
    tint: Option<UniformBinding>,
}

impl DemoMode for PulsingColor {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        let vertices = ctx.vertex_buffer("Pulsing Vertices", &VERTICES)?;
        let tint = ctx.uniform_bind_group("Tint", &TintUniform::at(0.0), ShaderStageFlags::FRAGMENT)?;
        let pipeline = ctx.program(
            "shaders/hello-triangle.vert.wgsl",
            "shaders/uniform-color.frag.wgsl",
            ProgramLayout {
                label: Some("Pulsing Color".into()),
                vertex_layouts: vec![PositionVertex::layout()],
                bind_group_layouts: vec![tint.layout],
                ..Default::default()
            },
        )?;

        self.pipeline = Some(pipeline);
        self.vertices = Some(vertices);
        self.tint = Some(tint);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        let (Some(pipeline), Some(vertices), Some(tint)) = (self.pipeline, self.vertices, self.tint) else {
            return;
        };
        ctx.write_uniform(tint.buffer, &TintUniform::at(ctx.time));
        ctx.gpu.set_render_pipeline(pipeline);
        ctx.gpu.set_bind_group(0, tint.bind_group);
        ctx.gpu.set_vertex_buffer(0, vertices, 0);
        ctx.gpu.draw(0..3, 0..1);
    }
}
