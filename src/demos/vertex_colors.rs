use crate::backend::{BufferHandle, RenderPipelineHandle};
use crate::demos::common::ColorVertex;
use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, ProgramLayout, SetupContext};

const VERTICES: [ColorVertex; 3] = [
    ColorVertex { position: [-0.5, -0.5, 0.0], color: [1.0, 0.0, 0.0, 1.0] },
    ColorVertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0, 1.0] },
    ColorVertex { position: [0.0, 0.5, 0.0], color: [0.0, 0.0, 1.0, 1.0] },
];

/// Per-vertex colours interpolated across a triangle
#[derive(Debug, Default)]
pub struct VertexColors {
    pipeline: Option<RenderPipelineHandle>,
    vertices: Option<BufferHandle>,
}

impl DemoMode for VertexColors {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        self.vertices = Some(ctx.vertex_buffer("Colored Vertices", &VERTICES)?);
        self.pipeline = Some(ctx.program(
            "shaders/vertex-color.vert.wgsl",
            "shaders/vertex-color.frag.wgsl",
            ProgramLayout {
                label: Some("Vertex Colors".into()),
                vertex_layouts: vec![ColorVertex::layout()],
                ..Default::default()
            },
        )?);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        if let (Some(pipeline), Some(vertices)) = (self.pipeline, self.vertices) {
            ctx.gpu.set_render_pipeline(pipeline);
            ctx.gpu.set_vertex_buffer(0, vertices, 0);
            ctx.gpu.draw(0..3, 0..1);
        }
    }
}
