//! Error types shared across Fitroom crates.

use std::path::PathBuf;

/// Top-level error type for Fitroom operations.
#[derive(Debug, thiserror::Error)]
pub enum FitroomError {
    #[error("Video source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("Frame unavailable: {message}")]
    FrameUnavailable { message: String },

    #[error("Selection {index} out of range ({available} items loaded)")]
    SelectionOutOfRange { index: usize, available: usize },

    #[error("Malformed clothing asset {path}: {reason}")]
    MalformedAsset { path: PathBuf, reason: String },

    #[error("Image has zero dimension: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("No clothing assets loaded from {dir}")]
    EmptyWardrobe { dir: PathBuf },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FitroomError.
pub type FitroomResult<T> = Result<T, FitroomError>;

impl FitroomError {
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: msg.into(),
        }
    }

    pub fn frame_unavailable(msg: impl Into<String>) -> Self {
        Self::FrameUnavailable {
            message: msg.into(),
        }
    }

    pub fn malformed_asset(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedAsset {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error only affects a single tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FrameUnavailable { .. })
    }
}
