//! Texture loading

use crate::backend::types::*;
use crate::backend::{TextureHandle, TextureViewHandle};
use crate::error::TextureError;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// Decoded RGBA8 pixels ready for upload
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load texture from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(img, &name))
    }

    /// Wrap raw RGBA8 pixels
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, name: &str) -> Result<Self, TextureError> {
        let expected = rgba_len(width, height);
        if data.len() != expected || expected == 0 {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            format: TextureFormat::Rgba8UnormSrgb,
            data,
            name: name.to_string(),
        })
    }

    fn from_image(img: DynamicImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        let data = img.to_rgba8().into_raw();

        Self {
            width,
            height,
            format: TextureFormat::Rgba8UnormSrgb,
            data,
            name: name.to_string(),
        }
    }

    /// Create a checkerboard texture with `cell`-pixel squares
    pub fn checkerboard(size: u32, cell: u32, color1: [u8; 4], color2: [u8; 4]) -> Self {
        let cell = cell.max(1);
        let mut data = Vec::with_capacity(rgba_len(size, size));

        for y in 0..size {
            for x in 0..size {
                let is_even = ((x / cell) + (y / cell)) % 2 == 0;
                let color = if is_even { color1 } else { color2 };
                data.extend_from_slice(&color);
            }
        }

        Self {
            width: size,
            height: size,
            format: TextureFormat::Rgba8UnormSrgb,
            data,
            name: "checkerboard".to_string(),
        }
    }
}

/// Uploaded texture and its default view
#[derive(Debug, Clone, Copy)]
pub struct GpuTexture {
    pub handle: TextureHandle,
    pub view: TextureViewHandle,
    pub width: u32,
    pub height: u32,
}

/// Byte length of a tightly packed RGBA8 image
fn rgba_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard() {
        let tex = TextureData::checkerboard(16, 8, [255; 4], [0, 0, 0, 255]);
        assert_eq!(tex.data.len(), 16 * 16 * 4);
        assert_eq!(&tex.data[0..4], &[255; 4]);
        // first pixel of the second cell
        assert_eq!(&tex.data[8 * 4..8 * 4 + 4], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_rgba_len_does_not_wrap() {
        assert_eq!(rgba_len(32768, 32768), 4 << 30);
        assert_eq!(rgba_len(u32::MAX, 1), u32::MAX as usize * 4);
    }

    #[test]
    fn test_from_rgba_size_mismatch() {
        let err = TextureData::from_rgba(2, 2, vec![0; 15], "bad").unwrap_err();
        assert!(matches!(
            err,
            TextureError::SizeMismatch {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = TextureData::from_file("does/not/exist.png").unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn test_corrupt_file() {
        let path = std::env::temp_dir().join(format!("demo-sandbox-{}-corrupt.png", std::process::id()));
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = TextureData::from_file(&path).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }
}
