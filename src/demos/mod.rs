//! Bundled demo scenes, numbered in the order they are stepped through.

pub mod common;
pub mod cubes;
pub mod hello_rectangle;
pub mod hello_triangle;
pub mod hello_window;
pub mod light_2d;
pub mod phong;
pub mod pulsing_color;
pub mod textured_quad;
pub mod vertex_colors;

use crate::mode::ModeRegistry;

pub use cubes::{FreeLookCubes, SpinningCube};
pub use hello_rectangle::HelloRectangle;
pub use hello_triangle::HelloTriangle;
pub use hello_window::HelloWindow;
pub use light_2d::Light2d;
pub use phong::PhongLighting;
pub use pulsing_color::PulsingColor;
pub use textured_quad::{RotatingQuad, TexturedQuad};
pub use vertex_colors::VertexColors;

/// Registry holding every bundled demo under ids 1 through 11
pub fn registry() -> ModeRegistry {
    let mut registry = ModeRegistry::new();
    registry.register_default::<HelloWindow>(1, "Hello Window");
    registry.register_default::<HelloTriangle>(2, "Hello Triangle");
    registry.register_default::<HelloRectangle>(3, "Hello Rectangle");
    registry.register_default::<Light2d>(4, "Simple 2D Light");
    registry.register_default::<PulsingColor>(5, "Pulsing Color");
    registry.register_default::<VertexColors>(6, "Vertex Colors");
    registry.register_default::<TexturedQuad>(7, "Textured Quad");
    registry.register_default::<RotatingQuad>(8, "Rotating Quad");
    registry.register_default::<SpinningCube>(9, "Spinning Cube");
    registry.register_default::<FreeLookCubes>(10, "Free Look");
    registry.register_default::<PhongLighting>(11, "Phong Lighting");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ModeId;

    #[test]
    fn test_registry_is_contiguous() {
        let registry = registry();
        assert_eq!(registry.len(), 11);
        assert!(registry.ids().eq((1..=11).map(ModeId)));
        assert_eq!(registry.title(ModeId(4)), Some("Simple 2D Light"));
    }
}
