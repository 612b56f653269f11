//! Background thread that ticks a session at a fixed interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use fitroom_common::clock::{RateController, SessionClock};
use fitroom_common::error::{FitroomError, FitroomResult};

use crate::controller::{SessionController, StatsCounters, TickStats};
use crate::display::DisplaySink;
use crate::selection::SelectionHandle;

/// Log every Nth consecutive missing frame after the first.
const UNAVAILABLE_LOG_EVERY: u64 = 100;

/// Owns a running [`SessionController`] on a dedicated thread.
///
/// Selection changes go through [`PreviewWorker::selection`]; frames come
/// out through whatever sink the worker was spawned with. Dropping the
/// worker stops the thread and closes the source.
pub struct PreviewWorker {
    stop_flag: Arc<AtomicBool>,
    selection: SelectionHandle,
    stats: Arc<StatsCounters>,
    /// Set when the thread could not open the source.
    failure: Arc<Mutex<Option<FitroomError>>>,
    handle: Option<JoinHandle<SessionController>>,
}

impl PreviewWorker {
    /// Move `controller` onto a new thread and tick it every `interval`.
    ///
    /// The controller must already be started.
    pub fn spawn<S>(
        controller: SessionController,
        sink: S,
        interval: Duration,
    ) -> FitroomResult<Self>
    where
        S: DisplaySink + Send + 'static,
    {
        if !controller.is_running() {
            return Err(FitroomError::session("Cannot spawn worker for a stopped session"));
        }

        Self::start_thread(controller, sink, interval)
    }

    /// Like [`PreviewWorker::spawn`], but the source is opened on the worker
    /// thread, so the caller never waits on a slow camera.
    ///
    /// If opening fails the thread exits at once; the error is available
    /// from [`PreviewWorker::take_failure`] and [`PreviewWorker::stop`]
    /// returns the stopped controller.
    pub fn launch<S>(
        controller: SessionController,
        sink: S,
        interval: Duration,
    ) -> FitroomResult<Self>
    where
        S: DisplaySink + Send + 'static,
    {
        Self::start_thread(controller, sink, interval)
    }

    fn start_thread<S>(
        controller: SessionController,
        sink: S,
        interval: Duration,
    ) -> FitroomResult<Self>
    where
        S: DisplaySink + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let selection = controller.selection_handle();
        let stats = controller.stats_handle();
        let failure = Arc::new(Mutex::new(None));

        let thread_stop = Arc::clone(&stop_flag);
        let thread_failure = Arc::clone(&failure);
        let handle = std::thread::Builder::new()
            .name("fitroom-preview".to_string())
            .spawn(move || {
                let mut controller = controller;
                if !controller.is_running() {
                    if let Err(e) = controller.start() {
                        tracing::error!(error = %e, "Failed to open video source");
                        if let Ok(mut slot) = thread_failure.lock() {
                            *slot = Some(e);
                        }
                        return controller;
                    }
                }
                run_loop(controller, sink, interval, thread_stop)
            })?;

        tracing::info!(interval_ms = interval.as_millis() as u64, "Preview worker started");
        Ok(Self {
            stop_flag,
            selection,
            stats,
            failure,
            handle: Some(handle),
        })
    }

    /// Handle for changing the garment while the worker runs.
    pub fn selection(&self) -> &SelectionHandle {
        &self.selection
    }

    pub fn stats(&self) -> TickStats {
        self.stats.snapshot()
    }

    /// The error that kept the thread from opening the source, if any.
    pub fn take_failure(&self) -> Option<FitroomError> {
        self.failure.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Whether the thread has exited on its own.
    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }

    /// Stop the thread and hand back the (stopped) controller.
    pub fn stop(mut self) -> Option<SessionController> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<SessionController> {
        self.stop_flag.store(true, Ordering::SeqCst);
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(controller) => Some(controller),
            Err(_) => {
                tracing::error!("Preview worker panicked");
                None
            }
        }
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop<S: DisplaySink>(
    mut controller: SessionController,
    mut sink: S,
    interval: Duration,
    stop_flag: Arc<AtomicBool>,
) -> SessionController {
    let clock = SessionClock::start();
    let mut rate = RateController::with_interval(interval);
    let mut missing_in_a_row: u64 = 0;

    while !stop_flag.load(Ordering::SeqCst) {
        let now = clock.elapsed_ns();
        if !rate.should_tick(now) {
            std::thread::sleep(rate.time_until_next(now).min(interval));
            continue;
        }

        match controller.tick(&mut sink) {
            Ok(_) => {
                if missing_in_a_row > 0 {
                    tracing::info!(skipped = missing_in_a_row, "Frames available again");
                    missing_in_a_row = 0;
                }
            }
            Err(e) if e.is_transient() => {
                missing_in_a_row += 1;
                if missing_in_a_row == 1 || missing_in_a_row % UNAVAILABLE_LOG_EVERY == 0 {
                    tracing::warn!(error = %e, skipped = missing_in_a_row, "No frame this tick");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Preview tick failed, stopping worker");
                break;
            }
        }
    }

    controller.stop();
    controller
}
