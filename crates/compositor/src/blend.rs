//! Alpha blending of a scaled garment onto a frame.

use image::RgbaImage;

use fitroom_common::error::{FitroomError, FitroomResult};

use crate::cloth::{ClothingImage, Frame};
use crate::placement::Placement;
use crate::resample::resize_rgba;

/// A garment resampled and clipped for one frame size.
///
/// Scaling is the expensive half of compositing and depends only on the
/// frame size, so callers that composite the same garment every tick can
/// prepare it once and reuse it while the frame size is unchanged.
#[derive(Debug, Clone)]
pub struct ScaledCloth {
    placement: Placement,
    frame_width: u32,
    frame_height: u32,
    /// Resized garment cropped to the visible region.
    pixels: RgbaImage,
}

impl ScaledCloth {
    /// Scale and clip `cloth` for a `frame_width × frame_height` frame.
    pub fn prepare(cloth: &ClothingImage, frame_width: u32, frame_height: u32) -> FitroomResult<Self> {
        let placement = Placement::compute(frame_width, frame_height, cloth.width(), cloth.height())?;
        let resized = resize_rgba(
            cloth.pixels(),
            placement.resized_width,
            placement.resized_height,
        )?;

        // Keep the top-left visible part; clipped rows and columns are dropped.
        let pixels = if placement.is_clipped() {
            image::imageops::crop_imm(
                &resized,
                0,
                0,
                placement.visible_width,
                placement.visible_height,
            )
            .to_image()
        } else {
            resized
        };

        Ok(Self {
            placement,
            frame_width,
            frame_height,
            pixels,
        })
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Whether this garment was prepared for frames of the given size.
    pub fn fits(&self, frame_width: u32, frame_height: u32) -> bool {
        (self.frame_width, self.frame_height) == (frame_width, frame_height)
    }

    /// Blend onto `frame` in place.
    pub fn apply(&self, frame: &mut Frame) -> FitroomResult<()> {
        if !self.fits(frame.width(), frame.height()) {
            return Err(FitroomError::session(format!(
                "garment prepared for {}x{} applied to {}x{} frame",
                self.frame_width,
                self.frame_height,
                frame.width(),
                frame.height()
            )));
        }

        let Placement { left, top, .. } = self.placement;
        for (x, y, src) in self.pixels.enumerate_pixels() {
            let alpha = src[3];
            let dst = frame.get_pixel_mut(left + x, top + y);
            match alpha {
                0 => {}
                255 => {
                    dst[0] = src[0];
                    dst[1] = src[1];
                    dst[2] = src[2];
                }
                _ => {
                    let a = alpha as f32 / 255.0;
                    for c in 0..3 {
                        dst[c] = blend_channel(src[c], dst[c], a);
                    }
                }
            }
        }
        Ok(())
    }
}

/// `a * fg + (1 - a) * bg`, rounded to the nearest 8-bit value.
#[inline]
pub fn blend_channel(fg: u8, bg: u8, a: f32) -> u8 {
    (a * fg as f32 + (1.0 - a) * bg as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Composite `cloth` onto `frame` in place and return where it landed.
pub fn composite_in_place(frame: &mut Frame, cloth: &ClothingImage) -> FitroomResult<Placement> {
    let scaled = ScaledCloth::prepare(cloth, frame.width(), frame.height())?;
    scaled.apply(frame)?;
    tracing::trace!(
        left = scaled.placement.left,
        top = scaled.placement.top,
        width = scaled.placement.visible_width,
        height = scaled.placement.visible_height,
        "Composited garment"
    );
    Ok(scaled.placement)
}

/// Composite `cloth` onto `frame`, returning the blended frame.
///
/// The output has the same dimensions as the input; pixels outside the
/// garment region are untouched.
pub fn composite(mut frame: Frame, cloth: &ClothingImage) -> FitroomResult<Frame> {
    composite_in_place(&mut frame, cloth)?;
    Ok(frame)
}
