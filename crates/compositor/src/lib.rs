//! Fitroom Compositor
//!
//! Overlays a flat clothing image onto a camera frame:
//! - **Fit:** uniform scale so the garment fits the frame on both axes
//! - **Anchor:** horizontally centered, top edge a quarter of the way down
//! - **Clip:** rows and columns that would leave the frame are dropped
//! - **Blend:** per-pixel alpha blend of each color channel
//!
//! ```text
//!  cloth (RGBA) ── area resample ──┐
//!                                  ├── clip ── alpha blend ──► frame (RGB)
//!  frame size ──── placement ──────┘
//! ```
//!
//! This crate is pure computation. No I/O, no shared state.

pub mod blend;
pub mod cloth;
pub mod placement;
pub mod resample;

pub use blend::{composite, composite_in_place, ScaledCloth};
pub use cloth::{AssetDefect, ClothingImage, Frame};
pub use placement::Placement;
pub use resample::{fit_frame, resize_area, resize_rgb, resize_rgba};
