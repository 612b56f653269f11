//! Garment geometry: uniform fit scale, anchor point, and clipping.

use fitroom_common::error::{FitroomError, FitroomResult};

/// Where and how large a garment lands on a frame.
///
/// All coordinates are in frame pixels. The visible region is
/// `left..left + visible_width` × `top..top + visible_height`; the resized
/// garment is cropped to its top-left `visible_width × visible_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Uniform scale applied to the garment.
    pub scale: f64,

    /// Garment size after scaling, before clipping.
    pub resized_width: u32,
    pub resized_height: u32,

    /// Top-left anchor in the frame.
    pub left: u32,
    pub top: u32,

    /// Garment size after clipping to the frame.
    pub visible_width: u32,
    pub visible_height: u32,
}

impl Placement {
    /// Compute the placement of a `cloth_w × cloth_h` garment on a
    /// `frame_w × frame_h` frame.
    ///
    /// The garment is scaled by `min(frame_w / cloth_w, frame_h / cloth_h)`
    /// (which may upscale), centered horizontally, and anchored a quarter of
    /// the frame height from the top.
    pub fn compute(frame_w: u32, frame_h: u32, cloth_w: u32, cloth_h: u32) -> FitroomResult<Self> {
        if frame_w == 0 || frame_h == 0 {
            return Err(FitroomError::EmptyImage {
                width: frame_w,
                height: frame_h,
            });
        }
        if cloth_w == 0 || cloth_h == 0 {
            return Err(FitroomError::EmptyImage {
                width: cloth_w,
                height: cloth_h,
            });
        }

        let scale = (frame_w as f64 / cloth_w as f64).min(frame_h as f64 / cloth_h as f64);
        let resized_width = scaled_len(cloth_w, scale);
        let resized_height = scaled_len(cloth_h, scale);

        let top = frame_h / 4;
        // Floor division; a garment wider than the frame pins to the left edge.
        let left = (frame_w as i64 - resized_width as i64).div_euclid(2).max(0) as u32;

        let visible_height = resized_height.min(frame_h - top);
        let visible_width = resized_width.min(frame_w - left);

        Ok(Self {
            scale,
            resized_width,
            resized_height,
            left,
            top,
            visible_width,
            visible_height,
        })
    }

    /// Whether any rows or columns of the resized garment are dropped.
    pub fn is_clipped(&self) -> bool {
        self.visible_width < self.resized_width || self.visible_height < self.resized_height
    }

    /// Whether the frame pixel `(x, y)` is covered by the garment.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left
            && y >= self.top
            && x < self.left + self.visible_width
            && y < self.top + self.visible_height
    }
}

fn scaled_len(len: u32, scale: f64) -> u32 {
    ((len as f64 * scale).round() as u32).max(1)
}
