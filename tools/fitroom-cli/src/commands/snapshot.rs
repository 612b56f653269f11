//! Save one frame of the live preview.

use std::path::PathBuf;
use std::sync::Arc;

use fitroom_common::clock::RateController;
use fitroom_common::config::{AppConfig, SourceKind};
use fitroom_compositor::Frame;
use fitroom_session::{DisplaySink, SessionController, TickOutcome, Wardrobe};

/// Keeps only the most recent frame.
#[derive(Default)]
struct LastFrame(Option<Frame>);

impl DisplaySink for LastFrame {
    fn show(&mut self, frame: Frame) {
        self.0 = Some(frame);
    }
}

pub fn run(
    mut config: AppConfig,
    item: Option<usize>,
    output: PathBuf,
    synthetic: bool,
    wardrobe_dir: Option<PathBuf>,
    max_ticks: u32,
) -> anyhow::Result<()> {
    if synthetic {
        config.camera.source = SourceKind::Synthetic;
    }
    if let Some(dir) = wardrobe_dir {
        config.wardrobe.dir = dir;
    }

    let wardrobe = Wardrobe::load(&config.wardrobe)
        .map_err(|e| anyhow::anyhow!("Failed to load wardrobe: {e}"))?;
    let mut controller = SessionController::from_config(Arc::new(wardrobe), &config.camera);
    if let Some(index) = item {
        controller.select(index)?;
    }

    println!("Opening {}...", controller.source_name());
    controller
        .start()
        .map_err(|e| anyhow::anyhow!("Failed to start preview: {e}"))?;

    let mut sink = LastFrame::default();
    let mut rate = RateController::with_interval(config.camera.tick_interval());
    let started = std::time::Instant::now();
    let mut outcome = None;
    let mut attempts = 0;

    while attempts < max_ticks {
        let now = started.elapsed().as_nanos() as u64;
        if !rate.should_tick(now) {
            std::thread::sleep(rate.time_until_next(now));
            continue;
        }
        attempts += 1;
        match controller.tick(&mut sink) {
            Ok(result) => {
                outcome = Some(result);
                break;
            }
            Err(e) if e.is_transient() => {
                tracing::debug!(attempt = attempts, error = %e, "No frame yet");
            }
            Err(e) => return Err(anyhow::anyhow!("Preview tick failed: {e}")),
        }
    }
    controller.stop();

    let (Some(outcome), Some(frame)) = (outcome, sink.0) else {
        anyhow::bail!("No frame received after {max_ticks} ticks");
    };

    frame
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;

    match outcome {
        TickOutcome::Passthrough => println!("Frame captured without garment"),
        TickOutcome::Composited { index } => {
            let name = controller
                .wardrobe()
                .get(index)
                .map(|i| i.name.as_str())
                .unwrap_or("?");
            println!("Frame captured wearing [{index}] {name}");
        }
    }
    println!("Written: {} ({}x{})", output.display(), frame.width(), frame.height());
    Ok(())
}
