use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

use fitroom_capture::{FrameReader, SyntheticSource, VideoSource};
use fitroom_common::config::WardrobeConfig;
use fitroom_common::error::{FitroomError, FitroomResult};
use fitroom_compositor::{ClothingImage, Frame};
use fitroom_session::{
    frame_slot, DisplaySink, PreviewState, PreviewWorker, SessionController, TickOutcome, Wardrobe,
};

/// Replays a fixed list of read results, then reports end of stream.
struct ScriptedSource {
    script: Vec<Option<Frame>>,
}

struct ScriptedReader {
    script: VecDeque<Option<Frame>>,
}

impl VideoSource for ScriptedSource {
    fn open(&mut self) -> FitroomResult<Box<dyn FrameReader>> {
        Ok(Box::new(ScriptedReader {
            script: self.script.clone().into(),
        }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

impl FrameReader for ScriptedReader {
    fn read(&mut self) -> FitroomResult<Frame> {
        match self.script.pop_front() {
            Some(Some(frame)) => Ok(frame),
            Some(None) => Err(FitroomError::frame_unavailable("dropped frame")),
            None => Err(FitroomError::frame_unavailable("end of stream")),
        }
    }
}

struct BrokenCamera;

impl VideoSource for BrokenCamera {
    fn open(&mut self) -> FitroomResult<Box<dyn FrameReader>> {
        Err(FitroomError::source_unavailable("no camera attached"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[derive(Default)]
struct RecordingSink {
    frames: Vec<Frame>,
}

impl DisplaySink for RecordingSink {
    fn show(&mut self, frame: Frame) {
        self.frames.push(frame);
    }
}

fn grey_frame(width: u32, height: u32) -> Frame {
    RgbImage::from_pixel(width, height, Rgb([50, 50, 50]))
}

fn opaque_cloth(width: u32, height: u32, color: [u8; 3]) -> ClothingImage {
    ClothingImage::new(RgbaImage::from_pixel(
        width,
        height,
        Rgba([color[0], color[1], color[2], 255]),
    ))
    .unwrap()
}

fn three_item_wardrobe() -> Arc<Wardrobe> {
    Arc::new(Wardrobe::from_items(vec![
        ("red".to_string(), opaque_cloth(20, 40, [255, 0, 0])),
        ("green".to_string(), opaque_cloth(20, 40, [0, 255, 0])),
        ("blue".to_string(), opaque_cloth(20, 40, [0, 0, 255])),
    ]))
}

fn scripted(frames: Vec<Option<Frame>>) -> Box<dyn VideoSource> {
    Box::new(ScriptedSource { script: frames })
}

#[test]
fn idle_session_passes_frames_through() {
    let frame = grey_frame(64, 48);
    let mut controller =
        SessionController::new(three_item_wardrobe(), scripted(vec![Some(frame.clone())]), 64, 48);
    controller.start().unwrap();

    let mut sink = RecordingSink::default();
    let outcome = controller.tick(&mut sink).unwrap();

    assert_eq!(outcome, TickOutcome::Passthrough);
    assert_eq!(sink.frames.len(), 1);
    assert_eq!(sink.frames[0], frame);
}

#[test]
fn selected_garment_is_composited_below_the_top_quarter() {
    let mut controller = SessionController::new(
        three_item_wardrobe(),
        scripted(vec![Some(grey_frame(64, 48))]),
        64,
        48,
    );
    controller.start().unwrap();
    controller.select(2).unwrap();

    let mut sink = RecordingSink::default();
    let outcome = controller.tick(&mut sink).unwrap();
    assert_eq!(outcome, TickOutcome::Composited { index: 2 });

    // 20x40 fitted into 64x48 → 24x48 at left 20, top 12, clipped to 36 rows.
    let shown = &sink.frames[0];
    assert_eq!(shown.get_pixel(0, 0), &Rgb([50, 50, 50]));
    assert_eq!(shown.get_pixel(20, 11), &Rgb([50, 50, 50]));
    assert_eq!(shown.get_pixel(20, 12), &Rgb([0, 0, 255]));
    assert_eq!(shown.get_pixel(43, 47), &Rgb([0, 0, 255]));
    assert_eq!(shown.get_pixel(44, 47), &Rgb([50, 50, 50]));
}

#[test]
fn out_of_range_selection_keeps_previous_choice() {
    let controller = SessionController::new(three_item_wardrobe(), scripted(vec![]), 64, 48);
    controller.select(1).unwrap();

    let err = controller.select(5).unwrap_err();
    assert!(matches!(
        err,
        FitroomError::SelectionOutOfRange {
            index: 5,
            available: 3
        }
    ));
    assert_eq!(controller.state(), PreviewState::Previewing { index: 1 });
}

#[test]
fn missing_frame_skips_display_and_next_tick_retries() {
    let mut controller = SessionController::new(
        three_item_wardrobe(),
        scripted(vec![Some(grey_frame(32, 24)), None, Some(grey_frame(32, 24))]),
        32,
        24,
    );
    controller.start().unwrap();
    let mut sink = RecordingSink::default();

    assert!(controller.tick(&mut sink).is_ok());
    let err = controller.tick(&mut sink).unwrap_err();
    assert!(matches!(err, FitroomError::FrameUnavailable { .. }));
    assert_eq!(sink.frames.len(), 1);
    assert!(controller.is_running());

    assert!(controller.tick(&mut sink).is_ok());
    assert_eq!(sink.frames.len(), 2);

    let stats = controller.stats();
    assert_eq!(stats.frames_shown, 2);
    assert_eq!(stats.frames_unavailable, 1);
    assert!(stats.started_at.is_some());
}

#[test]
fn end_of_stream_is_reported_every_tick() {
    let mut controller = SessionController::new(three_item_wardrobe(), scripted(vec![]), 32, 24);
    controller.start().unwrap();
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        assert!(matches!(
            controller.tick(&mut sink),
            Err(FitroomError::FrameUnavailable { .. })
        ));
    }
    assert!(sink.frames.is_empty());
}

#[test]
fn frames_of_another_size_are_fitted() {
    let mut controller = SessionController::new(
        three_item_wardrobe(),
        scripted(vec![Some(grey_frame(128, 96))]),
        64,
        48,
    );
    controller.start().unwrap();
    let mut sink = RecordingSink::default();
    controller.tick(&mut sink).unwrap();
    assert_eq!(sink.frames[0].dimensions(), (64, 48));
}

#[test]
fn clearing_selection_returns_to_passthrough() {
    let frame = grey_frame(32, 24);
    let mut controller = SessionController::new(
        three_item_wardrobe(),
        scripted(vec![Some(frame.clone()), Some(frame.clone())]),
        32,
        24,
    );
    controller.start().unwrap();
    let mut sink = RecordingSink::default();

    controller.select(0).unwrap();
    assert_eq!(
        controller.tick(&mut sink).unwrap(),
        TickOutcome::Composited { index: 0 }
    );
    controller.clear_selection();
    assert_eq!(controller.tick(&mut sink).unwrap(), TickOutcome::Passthrough);
    assert_eq!(sink.frames[1], frame);
}

#[test]
fn start_reports_unavailable_source() {
    let mut controller = SessionController::new(three_item_wardrobe(), Box::new(BrokenCamera), 32, 24);
    assert!(matches!(
        controller.start(),
        Err(FitroomError::SourceUnavailable { .. })
    ));
    assert!(!controller.is_running());

    let mut sink = RecordingSink::default();
    assert!(matches!(
        controller.tick(&mut sink),
        Err(FitroomError::Session { .. })
    ));
}

#[test]
fn start_twice_is_rejected() {
    let mut controller = SessionController::new(three_item_wardrobe(), scripted(vec![]), 32, 24);
    controller.start().unwrap();
    assert!(matches!(controller.start(), Err(FitroomError::Session { .. })));
    controller.stop();
    assert!(controller.start().is_ok());
}

#[test]
fn empty_wardrobe_cannot_start() {
    let mut controller = SessionController::new(
        Arc::new(Wardrobe::default()),
        Box::new(SyntheticSource::new(32, 24)),
        32,
        24,
    );
    assert!(matches!(
        controller.start(),
        Err(FitroomError::EmptyWardrobe { .. })
    ));
}

#[test]
fn worker_publishes_latest_frame() {
    let mut controller = SessionController::new(
        three_item_wardrobe(),
        Box::new(SyntheticSource::new(40, 30)),
        40,
        30,
    );
    controller.start().unwrap();

    let (tx, mut rx) = frame_slot();
    let worker = PreviewWorker::spawn(controller, tx, Duration::from_millis(1)).unwrap();
    worker.selection().select(1).unwrap();

    // Green garment 20x40 in a 40x30 frame: 15x30 at left 12, top 7.
    let garment = Rgb([0, 255, 0]);
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut dressed = None;
    while dressed.is_none() && Instant::now() < deadline {
        if let Some(frame) = rx.take_new() {
            assert_eq!(frame.dimensions(), (40, 30));
            if frame.get_pixel(12, 7) == &garment {
                dressed = Some(frame);
            }
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    let frame = dressed.expect("worker never published a frame with the garment");
    assert_eq!(frame.get_pixel(26, 29), &garment);
    assert_ne!(frame.get_pixel(12, 6), &garment);
    assert_ne!(frame.get_pixel(11, 7), &garment);

    let controller = worker.stop().unwrap();
    assert!(!controller.is_running());
    assert!(controller.stats().frames_shown >= 1);
    assert_eq!(controller.selection(), Some(1));
}

/// Source whose `open` waits for a go-ahead, like ffmpeg waiting on the
/// first camera frame.
struct GatedSource {
    gate: Receiver<()>,
    inner: SyntheticSource,
}

impl VideoSource for GatedSource {
    fn open(&mut self) -> FitroomResult<Box<dyn FrameReader>> {
        self.gate
            .recv()
            .map_err(|_| FitroomError::source_unavailable("gate dropped"))?;
        self.inner.open()
    }

    fn name(&self) -> &str {
        "gated"
    }
}

#[test]
fn launch_returns_before_source_opens() {
    let (open_tx, gate) = mpsc::channel();
    let controller = SessionController::new(
        three_item_wardrobe(),
        Box::new(GatedSource {
            gate,
            inner: SyntheticSource::new(40, 30),
        }),
        40,
        30,
    );

    let (tx, mut rx) = frame_slot();
    let worker = PreviewWorker::launch(controller, tx, Duration::from_millis(1)).unwrap();
    assert!(worker.stats().started_at.is_none());
    assert!(!worker.is_finished());
    assert!(rx.take_new().is_none());

    open_tx.send(()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut frame = None;
    while frame.is_none() && Instant::now() < deadline {
        frame = rx.take_new();
        std::thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(frame.expect("no frame after open").dimensions(), (40, 30));
    assert!(worker.stats().started_at.is_some());
    assert!(worker.take_failure().is_none());

    let controller = worker.stop().unwrap();
    assert!(!controller.is_running());
}

#[test]
fn launch_reports_unavailable_source_and_returns_controller() {
    let controller = SessionController::new(three_item_wardrobe(), Box::new(BrokenCamera), 32, 24);
    let (tx, mut rx) = frame_slot();
    let worker = PreviewWorker::launch(controller, tx, Duration::from_millis(1)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !worker.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(worker.is_finished());
    assert!(matches!(
        worker.take_failure(),
        Some(FitroomError::SourceUnavailable { .. })
    ));
    assert!(worker.take_failure().is_none());
    assert!(rx.take_new().is_none());

    let controller = worker.stop().unwrap();
    assert!(!controller.is_running());
    assert_eq!(controller.stats().frames_shown, 0);
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fitroom_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn wardrobe_load_skips_bad_assets_and_sorts() {
    let dir = scratch_dir("wardrobe_load");

    RgbaImage::from_pixel(4, 8, Rgba([10, 20, 30, 200]))
        .save(dir.join("b_shirt.png"))
        .unwrap();
    RgbaImage::from_pixel(6, 6, Rgba([1, 2, 3, 255]))
        .save(dir.join("a_dress.PNG"))
        .unwrap();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])))
        .save(dir.join("c_flat.png"))
        .unwrap();
    std::fs::write(dir.join("d_garbage.png"), b"not an image").unwrap();
    std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

    let wardrobe = Wardrobe::load(&WardrobeConfig {
        dir: dir.clone(),
        ..Default::default()
    })
    .unwrap();

    let names: Vec<&str> = wardrobe.items().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["a_dress", "b_shirt"]);
    assert_eq!(wardrobe.get(1).unwrap().image.dimensions(), (4, 8));
    assert_eq!(wardrobe.rejected().len(), 2);
    assert_eq!(wardrobe.dir(), Some(dir.as_path()));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_directory_gives_empty_wardrobe_error_on_start() {
    let dir = scratch_dir("wardrobe_empty");
    let wardrobe = Wardrobe::load(&WardrobeConfig {
        dir: dir.clone(),
        ..Default::default()
    })
    .unwrap();
    assert!(wardrobe.is_empty());

    let mut controller =
        SessionController::new(Arc::new(wardrobe), Box::new(SyntheticSource::new(8, 8)), 8, 8);
    match controller.start() {
        Err(FitroomError::EmptyWardrobe { dir: reported }) => assert_eq!(reported, dir),
        other => panic!("expected EmptyWardrobe, got {other:?}"),
    }

    let _ = std::fs::remove_dir_all(&dir);
}
