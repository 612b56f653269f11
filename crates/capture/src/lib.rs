//! Fitroom Capture
//!
//! Video sources that feed the preview loop. A [`VideoSource`] opens into a
//! [`FrameReader`] handle; each `read` yields one RGB frame at the target
//! size or reports that no frame is available.
//!
//! # Sources
//!
//! ```text
//! /dev/videoN ── ffmpeg (v4l2 → rgb24, scaled) ── stdout ──► FfmpegCamera
//! test pattern ─────────────────────────────────────────────► SyntheticSource
//! ```

pub mod ffmpeg;
pub mod source;
pub mod synthetic;

pub use ffmpeg::FfmpegCamera;
pub use source::*;
pub use synthetic::SyntheticSource;

use fitroom_common::config::{CameraConfig, SourceKind};

/// Build the video source described by the camera configuration.
pub fn build_source(config: &CameraConfig) -> Box<dyn VideoSource> {
    match config.source {
        SourceKind::Ffmpeg => Box::new(FfmpegCamera::new(
            config.device.clone(),
            config.width,
            config.height,
        )),
        SourceKind::Synthetic => Box::new(SyntheticSource::new(config.width, config.height)),
    }
}
