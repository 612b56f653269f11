//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{FitroomError, FitroomResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where clothing assets are loaded from.
    pub wardrobe: WardrobeConfig,

    /// Video source and preview loop settings.
    pub camera: CameraConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Clothing asset location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WardrobeConfig {
    /// Directory scanned once at startup.
    pub dir: PathBuf,

    /// Accepted file extensions without the dot, matched case-insensitively.
    pub extensions: Vec<String>,
}

/// Which video source backs the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A V4L2 webcam read through an ffmpeg subprocess.
    Ffmpeg,
    /// Generated test pattern.
    Synthetic,
}

/// Video source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub source: SourceKind,

    /// Device path (e.g. "/dev/video0"). Auto-detected when unset.
    pub device: Option<String>,

    /// Target frame width; every source frame is fitted to this.
    pub width: u32,

    /// Target frame height.
    pub height: u32,

    /// Interval between preview ticks in milliseconds.
    pub tick_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "fitroom=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wardrobe: WardrobeConfig::default(),
            camera: CameraConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WardrobeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("clothes"),
            extensions: vec!["png".to_string()],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Ffmpeg,
            device: None,
            width: 640,
            height: 480,
            tick_interval_ms: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl CameraConfig {
    /// Tick interval as a duration.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &std::path::Path) -> FitroomResult<Self> {
        if !path.exists() {
            return Err(FitroomError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> FitroomResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config as pretty JSON at `path`, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> FitroomResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject settings the preview loop cannot run with.
    pub fn validate(&self) -> FitroomResult<()> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(FitroomError::config(format!(
                "camera size must be positive, got {}x{}",
                self.camera.width, self.camera.height
            )));
        }
        if self.camera.tick_interval_ms == 0 {
            return Err(FitroomError::config("tick_interval_ms must be positive"));
        }
        if self.wardrobe.extensions.is_empty() {
            return Err(FitroomError::config(
                "wardrobe.extensions must list at least one extension",
            ));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("fitroom").join("config.json")
}
