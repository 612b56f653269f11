//! Area-averaging resampler.
//!
//! Resizing runs through `fast_image_resize` with a box convolution: each
//! destination pixel is the mean of the source pixels its footprint covers,
//! so downscaling averages whole blocks instead of skipping samples.

use std::num::NonZeroU32;

use fast_image_resize as fir;
use image::{ImageBuffer, Pixel, RgbImage, RgbaImage};

use fitroom_common::error::{FitroomError, FitroomResult};

use crate::cloth::Frame;

fn pixel_type(channels: u8) -> FitroomResult<fir::PixelType> {
    match channels {
        1 => Ok(fir::PixelType::U8),
        2 => Ok(fir::PixelType::U8x2),
        3 => Ok(fir::PixelType::U8x3),
        4 => Ok(fir::PixelType::U8x4),
        n => Err(FitroomError::Other(anyhow::anyhow!(
            "no resampler for {n}-channel pixels"
        ))),
    }
}

fn non_zero(width: u32, height: u32) -> FitroomResult<(NonZeroU32, NonZeroU32)> {
    match (NonZeroU32::new(width), NonZeroU32::new(height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(FitroomError::EmptyImage { width, height }),
    }
}

/// Area-resample any 8-bit image buffer to `width × height`.
///
/// Zero-sized input or target is rejected with `EmptyImage`. Same-size input
/// is returned as a copy.
pub fn resize_area<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
) -> FitroomResult<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let (src_w, src_h) = non_zero(src.width(), src.height())?;
    let (dst_w, dst_h) = non_zero(width, height)?;
    if (src_w, src_h) == (dst_w, dst_h) {
        return Ok(src.clone());
    }

    let pixel_type = pixel_type(P::CHANNEL_COUNT)?;
    let source = fir::Image::from_vec_u8(src_w, src_h, src.as_raw().clone(), pixel_type)
        .map_err(|e| FitroomError::Other(anyhow::anyhow!("resize source error: {e}")))?;
    let mut target = fir::Image::new(dst_w, dst_h, pixel_type);

    let mut resizer = fir::Resizer::new(fir::ResizeAlg::Convolution(fir::FilterType::Box));
    resizer
        .resize(&source.view(), &mut target.view_mut())
        .map_err(|e| FitroomError::Other(anyhow::anyhow!("resize error: {e}")))?;

    ImageBuffer::from_raw(width, height, target.into_vec()).ok_or_else(|| {
        FitroomError::Other(anyhow::anyhow!("resampled buffer has unexpected length"))
    })
}

/// Area-resample an RGBA image to `width × height`.
pub fn resize_rgba(src: &RgbaImage, width: u32, height: u32) -> FitroomResult<RgbaImage> {
    resize_area(src, width, height)
}

/// Area-resample an RGB image to `width × height`.
pub fn resize_rgb(src: &RgbImage, width: u32, height: u32) -> FitroomResult<RgbImage> {
    resize_area(src, width, height)
}

/// Fit a source frame to the target preview size.
///
/// Frames already at the target size are passed through without copying.
pub fn fit_frame(frame: Frame, width: u32, height: u32) -> FitroomResult<Frame> {
    if frame.dimensions() == (width, height) {
        return Ok(frame);
    }
    tracing::trace!(
        from_w = frame.width(),
        from_h = frame.height(),
        to_w = width,
        to_h = height,
        "Fitting frame to target size"
    );
    resize_rgb(&frame, width, height)
}
