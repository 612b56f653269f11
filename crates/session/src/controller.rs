//! Preview session controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use fitroom_capture::{build_source, FrameReader, VideoSource};
use fitroom_common::clock::SessionClock;
use fitroom_common::config::CameraConfig;
use fitroom_common::error::{FitroomError, FitroomResult};
use fitroom_compositor::{fit_frame, ScaledCloth};

use crate::display::DisplaySink;
use crate::selection::{PreviewState, SelectionHandle};
use crate::wardrobe::Wardrobe;

/// What a successful tick displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickOutcome {
    /// The frame was shown unmodified.
    Passthrough,
    /// Garment `index` was composited onto the frame.
    Composited { index: usize },
}

/// Snapshot of a session's tick counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    /// Frames handed to the display sink.
    pub frames_shown: u64,

    /// Shown frames that carried a garment.
    pub frames_composited: u64,

    /// Ticks skipped because no frame could be read.
    pub frames_unavailable: u64,

    /// Wall-clock time the source was opened (RFC 3339).
    pub started_at: Option<String>,
}

impl TickStats {
    /// Share of ticks that produced no frame, as a percentage.
    pub fn unavailable_rate(&self) -> f64 {
        let total = self.frames_shown + self.frames_unavailable;
        if total == 0 {
            return 0.0;
        }
        self.frames_unavailable as f64 / total as f64 * 100.0
    }
}

/// Counters readable from any thread while a worker owns the controller.
#[derive(Debug, Default)]
pub struct StatsCounters {
    frames_shown: AtomicU64,
    frames_composited: AtomicU64,
    frames_unavailable: AtomicU64,
    started_at: std::sync::Mutex<Option<String>>,
}

impl StatsCounters {
    pub fn snapshot(&self) -> TickStats {
        TickStats {
            frames_shown: self.frames_shown.load(Ordering::Relaxed),
            frames_composited: self.frames_composited.load(Ordering::Relaxed),
            frames_unavailable: self.frames_unavailable.load(Ordering::Relaxed),
            started_at: self
                .started_at
                .lock()
                .map(|started| started.clone())
                .unwrap_or(None),
        }
    }

    fn mark_started(&self, wall: &str) {
        if let Ok(mut started) = self.started_at.lock() {
            *started = Some(wall.to_string());
        }
    }
}

/// Sequences frame acquisition, compositing, and display.
///
/// The controller owns the wardrobe, the selection, and the video source.
/// It does nothing on its own; each call to [`SessionController::tick`]
/// performs exactly one read → composite → show cycle.
pub struct SessionController {
    wardrobe: Arc<Wardrobe>,
    selection: SelectionHandle,
    source: Box<dyn VideoSource>,
    reader: Option<Box<dyn FrameReader>>,
    target_width: u32,
    target_height: u32,
    /// Last garment prepared for the target size, keyed by wardrobe index.
    scaled: Option<(usize, ScaledCloth)>,
    clock: Option<SessionClock>,
    stats: Arc<StatsCounters>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("wardrobe_len", &self.wardrobe.len())
            .field("selection", &self.selection.current())
            .field("source", &self.source.name())
            .field("running", &self.reader.is_some())
            .field("target", &(self.target_width, self.target_height))
            .finish()
    }
}

impl SessionController {
    /// Create an Idle controller that fits every frame to
    /// `target_width × target_height`.
    pub fn new(
        wardrobe: Arc<Wardrobe>,
        source: Box<dyn VideoSource>,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        let selection = SelectionHandle::new(wardrobe.len());
        Self {
            wardrobe,
            selection,
            source,
            reader: None,
            target_width,
            target_height,
            scaled: None,
            clock: None,
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// Create a controller with the source and target size from `config`.
    pub fn from_config(wardrobe: Arc<Wardrobe>, config: &CameraConfig) -> Self {
        Self::new(wardrobe, build_source(config), config.width, config.height)
    }

    pub fn wardrobe(&self) -> &Arc<Wardrobe> {
        &self.wardrobe
    }

    /// A handle for changing the selection from another thread.
    pub fn selection_handle(&self) -> SelectionHandle {
        self.selection.clone()
    }

    /// Shared tick counters.
    pub fn stats_handle(&self) -> Arc<StatsCounters> {
        Arc::clone(&self.stats)
    }

    pub fn stats(&self) -> TickStats {
        self.stats.snapshot()
    }

    /// Select garment `index`.
    pub fn select(&self, index: usize) -> FitroomResult<()> {
        self.selection.select(index)?;
        tracing::info!(index, "Garment selected");
        Ok(())
    }

    /// Return to Idle.
    pub fn clear_selection(&self) {
        self.selection.clear();
        tracing::info!("Garment cleared");
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection.current()
    }

    pub fn state(&self) -> PreviewState {
        self.selection.state()
    }

    pub fn is_running(&self) -> bool {
        self.reader.is_some()
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Seconds since the source was opened.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.as_ref().map(|c| c.elapsed_secs()).unwrap_or(0.0)
    }

    /// Open the video source.
    ///
    /// Fails when the wardrobe is empty or the source cannot be opened; the
    /// controller stays stopped in both cases.
    pub fn start(&mut self) -> FitroomResult<()> {
        if self.reader.is_some() {
            return Err(FitroomError::session("Session already started"));
        }
        if self.wardrobe.is_empty() {
            return Err(FitroomError::EmptyWardrobe {
                dir: self
                    .wardrobe
                    .dir()
                    .map(|dir| dir.to_path_buf())
                    .unwrap_or_default(),
            });
        }

        tracing::info!(source = self.source.name(), "Opening video source");
        let reader = self.source.open().map_err(|e| match e {
            e @ FitroomError::SourceUnavailable { .. } => e,
            other => FitroomError::source_unavailable(other.to_string()),
        })?;

        let clock = SessionClock::start();
        self.stats.mark_started(clock.epoch_wall());
        tracing::info!(
            epoch_wall = %clock.epoch_wall(),
            width = self.target_width,
            height = self.target_height,
            "Preview session started"
        );
        self.clock = Some(clock);
        self.reader = Some(reader);
        Ok(())
    }

    /// Release the video source. Selection and wardrobe are kept.
    pub fn stop(&mut self) {
        if self.reader.take().is_some() {
            let stats = self.stats.snapshot();
            tracing::info!(
                elapsed_secs = self.elapsed_secs(),
                frames_shown = stats.frames_shown,
                frames_unavailable = stats.frames_unavailable,
                "Preview session stopped"
            );
        }
        self.clock = None;
    }

    /// Run one read → composite → show cycle.
    ///
    /// When no frame can be read, returns `FrameUnavailable` without touching
    /// the sink; the session stays open and the next tick simply retries.
    pub fn tick(&mut self, sink: &mut dyn DisplaySink) -> FitroomResult<TickOutcome> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| FitroomError::session("Session not started"))?;

        let frame = match reader.read() {
            Ok(frame) => frame,
            Err(err) => {
                self.stats.frames_unavailable.fetch_add(1, Ordering::Relaxed);
                return Err(match err {
                    e @ FitroomError::FrameUnavailable { .. } => e,
                    other => FitroomError::frame_unavailable(other.to_string()),
                });
            }
        };
        let mut frame = fit_frame(frame, self.target_width, self.target_height)?;

        let outcome = match self.selection.current() {
            Some(index) => {
                self.scaled_cloth(index)?.apply(&mut frame)?;
                self.stats.frames_composited.fetch_add(1, Ordering::Relaxed);
                TickOutcome::Composited { index }
            }
            None => TickOutcome::Passthrough,
        };

        sink.show(frame);
        self.stats.frames_shown.fetch_add(1, Ordering::Relaxed);
        Ok(outcome)
    }

    /// Garment `index` scaled for the target size, prepared on first use.
    fn scaled_cloth(&mut self, index: usize) -> FitroomResult<&ScaledCloth> {
        let cached = matches!(&self.scaled, Some((i, _)) if *i == index);
        if !cached {
            let item = self
                .wardrobe
                .get(index)
                .ok_or(FitroomError::SelectionOutOfRange {
                    index,
                    available: self.wardrobe.len(),
                })?;
            let scaled = ScaledCloth::prepare(&item.image, self.target_width, self.target_height)?;
            tracing::debug!(
                index,
                name = %item.name,
                placement = ?scaled.placement(),
                "Prepared garment for preview"
            );
            self.scaled = Some((index, scaled));
        }
        match &self.scaled {
            Some((_, scaled)) => Ok(scaled),
            None => Err(FitroomError::session("garment cache empty")),
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_rate() {
        let stats = TickStats {
            frames_shown: 3,
            frames_unavailable: 1,
            ..Default::default()
        };
        assert!((stats.unavailable_rate() - 25.0).abs() < 1e-9);
        assert_eq!(TickStats::default().unavailable_rate(), 0.0);
    }

    #[test]
    fn test_stats_serialize() {
        let counters = StatsCounters::default();
        counters.frames_shown.fetch_add(2, Ordering::Relaxed);
        counters.mark_started("2026-01-01T00:00:00+00:00");

        let json = serde_json::to_value(counters.snapshot()).unwrap();
        assert_eq!(json["frames_shown"], 2);
        assert_eq!(json["started_at"], "2026-01-01T00:00:00+00:00");

        let outcome = serde_json::to_value(TickOutcome::Composited { index: 1 }).unwrap();
        assert_eq!(outcome["Composited"]["index"], 1);
    }
}
