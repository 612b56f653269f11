//! Frame and clothing image types.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};

use fitroom_common::error::{FitroomError, FitroomResult};

/// A camera frame: 8-bit RGB, row-major, no alpha.
pub type Frame = RgbImage;

/// Why a decoded image cannot be used as a clothing asset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetDefect {
    #[error("image has no alpha channel ({color:?})")]
    MissingAlpha { color: image::ColorType },

    #[error("image has zero dimension: {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
}

/// An immutable RGBA garment image with positive dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ClothingImage {
    pixels: RgbaImage,
}

impl ClothingImage {
    /// Wrap an RGBA buffer, rejecting zero-sized images.
    pub fn new(pixels: RgbaImage) -> FitroomResult<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(FitroomError::EmptyImage { width, height });
        }
        Ok(Self { pixels })
    }

    /// Convert a decoded image. The source must carry an alpha channel;
    /// 16-bit and float variants are narrowed to 8 bits per channel.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, AssetDefect> {
        let color = image.color();
        if !color.has_alpha() {
            return Err(AssetDefect::MissingAlpha { color });
        }
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(AssetDefect::ZeroSize { width, height });
        }
        Ok(Self {
            pixels: image.into_rgba8(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Downscale to fit inside `max_side × max_side`, keeping aspect ratio.
    /// Images already small enough are returned as-is.
    pub fn thumbnail(&self, max_side: u32) -> RgbaImage {
        let (width, height) = self.dimensions();
        let max_side = max_side.max(1);
        if width <= max_side && height <= max_side {
            return self.pixels.clone();
        }
        let scale = (max_side as f64 / width as f64).min(max_side as f64 / height as f64);
        let thumb_w = ((width as f64 * scale).round() as u32).clamp(1, max_side);
        let thumb_h = ((height as f64 * scale).round() as u32).clamp(1, max_side);
        imageops::resize(&self.pixels, thumb_w, thumb_h, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    #[test]
    fn test_rejects_zero_size() {
        let err = ClothingImage::new(RgbaImage::new(0, 10)).unwrap_err();
        assert!(matches!(
            err,
            FitroomError::EmptyImage {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn test_from_dynamic_requires_alpha() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        assert!(matches!(
            ClothingImage::from_dynamic(rgb),
            Err(AssetDefect::MissingAlpha { .. })
        ));

        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 4])));
        let cloth = ClothingImage::from_dynamic(rgba).unwrap();
        assert_eq!(cloth.dimensions(), (4, 2));
    }

    #[test]
    fn test_from_dynamic_narrows_luma_alpha() {
        let la = DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_pixel(
            3,
            3,
            image::LumaA([200, 128]),
        ));
        let cloth = ClothingImage::from_dynamic(la).unwrap();
        assert_eq!(cloth.pixels().get_pixel(1, 1), &Rgba([200, 200, 200, 128]));
    }

    #[test]
    fn test_thumbnail_keeps_aspect() {
        let cloth = ClothingImage::new(RgbaImage::from_pixel(400, 200, Rgba([9, 9, 9, 255]))).unwrap();
        let thumb = cloth.thumbnail(100);
        assert_eq!(thumb.dimensions(), (100, 50));
        assert_eq!(thumb.get_pixel(50, 25), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn test_thumbnail_small_image_unchanged() {
        let cloth = ClothingImage::new(RgbaImage::from_pixel(30, 60, Rgba([1, 1, 1, 1]))).unwrap();
        assert_eq!(cloth.thumbnail(100).dimensions(), (30, 60));
    }
}
