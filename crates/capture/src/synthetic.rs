//! Synthetic test pattern source.

use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use fitroom_common::error::{FitroomError, FitroomResult};
use fitroom_compositor::Frame;

use crate::source::{FrameReader, VideoSource};

/// Generates a moving test pattern at a fixed size.
///
/// With a frame limit the stream ends after that many frames and every
/// later read reports `FrameUnavailable`, like a camera that went away.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame_limit: Option<u64>,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_limit: None,
        }
    }

    /// End the stream after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

impl VideoSource for SyntheticSource {
    fn open(&mut self) -> FitroomResult<Box<dyn FrameReader>> {
        if self.width == 0 || self.height == 0 {
            return Err(FitroomError::source_unavailable(format!(
                "synthetic source has zero size {}x{}",
                self.width, self.height
            )));
        }
        Ok(Box::new(SyntheticReader {
            width: self.width,
            height: self.height,
            frame_limit: self.frame_limit,
            frame_index: 0,
        }))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct SyntheticReader {
    width: u32,
    height: u32,
    frame_limit: Option<u64>,
    frame_index: u64,
}

impl FrameReader for SyntheticReader {
    fn read(&mut self) -> FitroomResult<Frame> {
        if self.frame_limit.is_some_and(|limit| self.frame_index >= limit) {
            return Err(FitroomError::frame_unavailable("end of synthetic stream"));
        }
        let frame = test_pattern(self.width, self.height, self.frame_index);
        self.frame_index += 1;
        Ok(frame)
    }
}

/// Dark vertical gradient with a grey floor band and a marker that sweeps
/// left to right once every 120 frames.
pub fn test_pattern(width: u32, height: u32, frame_index: u64) -> Frame {
    let mut img: Frame = ImageBuffer::from_fn(width, height, |_, y| {
        let shade = 30 + (y * 60 / height.max(1)) as u8;
        Rgb([shade, shade, shade + 10])
    });

    let floor_top = height - height / 8;
    if height / 8 > 0 {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(0, floor_top as i32).of_size(width, height / 8),
            Rgb([90, 90, 90]),
        );
    }

    let phase = (frame_index % 120) as f64 / 120.0;
    let radius = (height.min(width) / 12).max(1) as i32;
    let cx = (phase * width as f64) as i32;
    let cy = (height / 8) as i32;
    draw_filled_circle_mut(&mut img, (cx, cy), radius, Rgb([230, 180, 40]));

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_dimensions() {
        let frame = test_pattern(64, 48, 0);
        assert_eq!(frame.dimensions(), (64, 48));
        assert_eq!(frame.get_pixel(10, 47), &Rgb([90, 90, 90]));
    }

    #[test]
    fn test_pattern_moves_between_frames() {
        assert_ne!(test_pattern(64, 48, 0), test_pattern(64, 48, 30));
    }

    #[test]
    fn test_tiny_pattern_does_not_panic() {
        let frame = test_pattern(1, 1, 7);
        assert_eq!(frame.dimensions(), (1, 1));
    }
}
