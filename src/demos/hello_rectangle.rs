use crate::backend::{BufferHandle, RenderPipelineHandle};
use crate::demos::common::{draw_indexed_mesh, PositionVertex, QUAD_INDICES};
use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, ProgramLayout, SetupContext};

const VERTICES: [PositionVertex; 4] = [
    PositionVertex { position: [-0.5, -0.5, 0.0] },
    PositionVertex { position: [0.5, -0.5, 0.0] },
    PositionVertex { position: [0.5, 0.5, 0.0] },
    PositionVertex { position: [-0.5, 0.5, 0.0] },
];

/// Indexed quad sharing the triangle program
#[derive(Debug, Default)]
pub struct HelloRectangle {
    mesh: Option<(RenderPipelineHandle, BufferHandle, BufferHandle)>,
}

impl DemoMode for HelloRectangle {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        let vertices = ctx.vertex_buffer("Rectangle Vertices", &VERTICES)?;
        let indices = ctx.index_buffer("Rectangle Indices", &QUAD_INDICES)?;
        let pipeline = ctx.program(
            "shaders/hello-triangle.vert.wgsl",
            "shaders/hello-triangle.frag.wgsl",
            ProgramLayout {
                label: Some("Hello Rectangle".into()),
                vertex_layouts: vec![PositionVertex::layout()],
                ..Default::default()
            },
        )?;
        self.mesh = Some((pipeline, vertices, indices));
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some((pipeline, vertices, indices)) = self.mesh {
            ctx.gpu.set_render_pipeline(pipeline);
            draw_indexed_mesh(ctx.gpu, vertices, indices, QUAD_INDICES.len() as u32, &[]);
        }
    }
}
