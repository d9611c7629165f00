use crate::backend::{BufferHandle, RenderPipelineHandle};
use crate::demos::common::PositionVertex;
use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, ProgramLayout, SetupContext};

const VERTICES: [PositionVertex; 3] = [
    PositionVertex { position: [-0.5, -0.5, 0.0] },
    PositionVertex { position: [0.5, -0.5, 0.0] },
    PositionVertex { position: [0.0, 0.5, 0.0] },
];

#[derive(Debug, Default)]
pub struct HelloTriangle {
    pipeline: Option<RenderPipelineHandle>,
    vertices: Option<BufferHandle>,
}

impl DemoMode for HelloTriangle {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        self.vertices = Some(ctx.vertex_buffer("Triangle Vertices", &VERTICES)?);
        self.pipeline = Some(ctx.program(
            "shaders/hello-triangle.vert.wgsl",
            "shaders/hello-triangle.frag.wgsl",
            ProgramLayout {
                label: Some("Hello Triangle".into()),
                vertex_layouts: vec![PositionVertex::layout()],
                ..Default::default()
            },
        )?);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        let (Some(pipeline), Some(vertices)) = (self.pipeline, self.vertices) else {
            return;
        };
        ctx.gpu.set_render_pipeline(pipeline);
        ctx.gpu.set_vertex_buffer(0, vertices, 0);
        ctx.gpu.draw(0..VERTICES.len() as u32, 0..1);
    }
}
