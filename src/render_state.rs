//! Global render toggles applied to every pipeline of a frame

use crate::backend::{PolygonMode, RasterState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFlags {
    wireframe: bool,
    depth_test: bool,
    warned_no_wireframe: bool,
}

impl RenderFlags {
    pub fn new(wireframe: bool, depth_test: bool) -> Self {
        Self {
            wireframe,
            depth_test,
            warned_no_wireframe: false,
        }
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    pub fn toggle_wireframe(&mut self) -> bool {
        self.wireframe = !self.wireframe;
        log::info!("Wireframe {}", if self.wireframe { "on" } else { "off" });
        self.wireframe
    }

    pub fn toggle_depth_test(&mut self) -> bool {
        self.depth_test = !self.depth_test;
        log::info!("Depth test {}", if self.depth_test { "on" } else { "off" });
        self.depth_test
    }

    /// Raster state for this frame. Wireframe renders filled on devices
    /// without line polygon mode.
    pub fn raster_state(&mut self, wireframe_supported: bool) -> RasterState {
        let polygon_mode = match (self.wireframe, wireframe_supported) {
            (true, true) => PolygonMode::Line,
            (true, false) => {
                if !self.warned_no_wireframe {
                    log::warn!("Wireframe requested but not supported by the device");
                    self.warned_no_wireframe = true;
                }
                PolygonMode::Fill
            }
            (false, _) => PolygonMode::Fill,
        };

        RasterState {
            polygon_mode,
            depth_test: self.depth_test,
        }
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self::new(false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involution() {
        let mut flags = RenderFlags::new(true, false);
        let before = flags.raster_state(true);
        flags.toggle_wireframe();
        assert_eq!(flags.raster_state(true).polygon_mode, PolygonMode::Fill);
        flags.toggle_wireframe();
        assert_eq!(flags.raster_state(true), before);

        flags.toggle_depth_test();
        flags.toggle_depth_test();
        assert_eq!(flags.raster_state(true), before);
    }

    #[test]
    fn test_wireframe_falls_back_to_fill() {
        let mut flags = RenderFlags::new(true, true);
        let state = flags.raster_state(false);
        assert_eq!(state.polygon_mode, PolygonMode::Fill);
        assert!(state.depth_test);
        assert!(flags.wireframe());
    }
}
