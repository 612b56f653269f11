//! Webcam capture through an `ffmpeg` subprocess.
//!
//! ffmpeg reads the V4L2 device, scales to the target size, and writes
//! packed `rgb24` frames to stdout. Each read pulls exactly one frame's
//! worth of bytes, so the stream stays aligned without any framing.

use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use fitroom_common::error::{FitroomError, FitroomResult};
use fitroom_compositor::Frame;

use crate::source::{command_exists, detect_default_webcam_device, FrameReader, VideoSource};

/// Webcam source backed by `ffmpeg -f video4linux2`.
#[derive(Debug, Clone)]
pub struct FfmpegCamera {
    device: Option<String>,
    width: u32,
    height: u32,
    name: String,
}

impl FfmpegCamera {
    /// Create a camera source. `device` is auto-detected when `None`.
    pub fn new(device: Option<String>, width: u32, height: u32) -> Self {
        let name = format!("ffmpeg:{}", device.as_deref().unwrap_or("auto"));
        Self {
            device,
            width,
            height,
            name,
        }
    }

    fn resolve_device(&self) -> FitroomResult<String> {
        let device = match &self.device {
            Some(device) => device.clone(),
            None => detect_default_webcam_device().ok_or_else(|| {
                FitroomError::source_unavailable("No webcam device found under /dev/video*")
            })?,
        };
        if !Path::new(&device).exists() {
            return Err(FitroomError::source_unavailable(format!(
                "Webcam device {device} does not exist"
            )));
        }
        Ok(device)
    }
}

impl VideoSource for FfmpegCamera {
    fn open(&mut self) -> FitroomResult<Box<dyn FrameReader>> {
        if !command_exists("ffmpeg") {
            return Err(FitroomError::source_unavailable("ffmpeg not found in PATH"));
        }
        let device = self.resolve_device()?;
        let args = capture_args(&device, self.width, self.height);
        tracing::debug!(?args, "Starting ffmpeg capture");

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                FitroomError::source_unavailable(format!("Failed to start ffmpeg: {e}"))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FitroomError::source_unavailable("Failed to capture ffmpeg stdout"))?;
        let stderr = child.stderr.take();

        // Drain stderr so ffmpeg never blocks on a full pipe.
        let stderr_task = stderr.map(|stderr| {
            std::thread::spawn(move || -> String {
                let mut output = String::new();
                let mut stderr = stderr;
                match stderr.read_to_string(&mut output) {
                    Ok(_) => output,
                    Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
                }
            })
        });

        tracing::info!(pid = child.id(), device = %device, "ffmpeg capture started");

        let mut reader = FfmpegReader {
            child: Some(child),
            stdout,
            stderr_task,
            width: self.width,
            height: self.height,
            pending: None,
        };

        // A device that cannot deliver its first frame is treated as unopenable.
        match reader.read() {
            Ok(frame) => {
                reader.pending = Some(frame);
                Ok(Box::new(reader))
            }
            Err(err) => {
                let stderr = reader.shutdown();
                Err(FitroomError::source_unavailable(format!(
                    "Could not read from {device}: {err}{}",
                    if stderr.trim().is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", stderr.trim())
                    }
                )))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An open ffmpeg capture process.
struct FfmpegReader {
    child: Option<Child>,
    stdout: ChildStdout,
    stderr_task: Option<JoinHandle<String>>,
    width: u32,
    height: u32,
    /// First frame, read while opening.
    pending: Option<Frame>,
}

impl FfmpegReader {
    /// Stop the process and return whatever it wrote to stderr.
    fn shutdown(&mut self) -> String {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.stderr_task
            .take()
            .and_then(|task| task.join().ok())
            .unwrap_or_default()
    }
}

impl FrameReader for FfmpegReader {
    fn read(&mut self) -> FitroomResult<Frame> {
        if let Some(frame) = self.pending.take() {
            return Ok(frame);
        }
        read_raw_frame(&mut self.stdout, self.width, self.height)
    }
}

impl Drop for FfmpegReader {
    fn drop(&mut self) {
        let stderr = self.shutdown();
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "ffmpeg capture stopped");
        }
    }
}

/// ffmpeg arguments for a low-latency raw RGB capture of `device`.
pub fn capture_args(device: &str, width: u32, height: u32) -> Vec<String> {
    let scale = format!("scale={width}:{height}");
    [
        "-loglevel",
        "error",
        "-nostats",
        "-fflags",
        "nobuffer",
        "-flags",
        "low_delay",
        "-f",
        "video4linux2",
        "-i",
        device,
        "-vf",
        scale.as_str(),
        "-pix_fmt",
        "rgb24",
        "-f",
        "rawvideo",
        "-",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

/// Read one packed `rgb24` frame of `width × height` from `reader`.
pub fn read_raw_frame<R: Read>(reader: &mut R, width: u32, height: u32) -> FitroomResult<Frame> {
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => FitroomError::frame_unavailable("end of stream"),
        _ => FitroomError::frame_unavailable(format!("read failed: {e}")),
    })?;
    Frame::from_raw(width, height, buf)
        .ok_or_else(|| FitroomError::frame_unavailable("frame buffer size mismatch"))
}
