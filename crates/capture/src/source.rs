//! Video source traits and device discovery.

use std::path::Path;
use std::process::Command;

use fitroom_common::error::FitroomResult;
use fitroom_compositor::Frame;

/// Something that can be opened to produce frames.
pub trait VideoSource: Send {
    /// Open the source. Fails with `SourceUnavailable` when the device or
    /// backend cannot be started. Dropping the returned reader releases it.
    fn open(&mut self) -> FitroomResult<Box<dyn FrameReader>>;

    /// Human-readable source name for logs and status lines.
    fn name(&self) -> &str;
}

/// An open video handle.
pub trait FrameReader: Send {
    /// Read the next frame. Fails with `FrameUnavailable` when no frame can
    /// be produced right now, including end of stream.
    fn read(&mut self) -> FitroomResult<Frame>;
}

/// Find webcam device nodes under `/dev`, lowest index first.
pub fn detect_webcam_devices() -> Vec<String> {
    let mut devices: Vec<(u32, String)> = std::fs::read_dir("/dev")
        .map(|entries| {
            entries
                .flatten()
                .filter_map(|entry| {
                    let name = entry.file_name();
                    let index = name.to_str()?.strip_prefix("video")?.parse::<u32>().ok()?;
                    Some((index, entry.path().to_string_lossy().into_owned()))
                })
                .collect()
        })
        .unwrap_or_default();
    devices.sort();
    devices.into_iter().map(|(_, path)| path).collect()
}

/// The first webcam device, if any.
pub fn detect_default_webcam_device() -> Option<String> {
    for idx in 0..16 {
        let candidate = format!("/dev/video{idx}");
        if Path::new(&candidate).exists() {
            return Some(candidate);
        }
    }
    detect_webcam_devices().into_iter().next()
}

/// Whether `binary` resolves on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("fitroom-definitely-not-a-binary"));
    }

    #[test]
    fn test_detected_devices_are_video_nodes() {
        for device in detect_webcam_devices() {
            assert!(device.starts_with("/dev/video"));
        }
    }
}
