use crate::error::ModeError;
use crate::mode::{DemoMode, FrameContext, SetupContext};

/// Clears the window to magenta and draws nothing
#[derive(Debug, Default)]
pub struct HelloWindow;

impl DemoMode for HelloWindow {
    fn setup(&mut self, _ctx: &mut SetupContext<'_>) -> Result<(), ModeError> {
        Ok(())
    }

    fn frame(&mut self, _ctx: &mut FrameContext<'_>) {}

    fn clear_color(&self) -> [f32; 4] {
        [1.0, 0.0, 1.0, 1.0]
    }
}
