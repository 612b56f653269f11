use std::sync::Arc;

use eframe::egui::{self, Color32};
use fitroom_common::config::AppConfig;
use fitroom_common::error::FitroomError;
use fitroom_compositor::Frame;
use fitroom_session::{
    frame_slot, FrameSlotReceiver, PreviewState, PreviewWorker, SelectionHandle,
    SessionController, Wardrobe,
};

const THUMBNAIL_SIDE: u32 = 100;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    fitroom_common::logging::init_logging(&config.logging);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Virtual Cloth Trial Room")
            .with_inner_size([960.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Virtual Cloth Trial Room",
        options,
        Box::new(move |cc| Box::new(TrialRoomApp::new(cc, config))),
    )
    .map_err(|e| anyhow::anyhow!("window launch failed: {e}"))
}

struct Thumbnail {
    index: usize,
    name: String,
    texture: egui::TextureHandle,
}

struct TrialRoomApp {
    config: AppConfig,
    thumbnails: Vec<Thumbnail>,
    selection: SelectionHandle,
    /// Present until the camera starts; the worker owns it afterwards.
    controller: Option<SessionController>,
    worker: Option<PreviewWorker>,
    frames: Option<FrameSlotReceiver>,
    preview: Option<egui::TextureHandle>,
    status: String,
    /// The worker is still waiting on the source.
    opening: bool,
}

impl TrialRoomApp {
    fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let (wardrobe, status) = match Wardrobe::load(&config.wardrobe) {
            Ok(wardrobe) if wardrobe.is_empty() => {
                let status = format!("No garments found in {}", config.wardrobe.dir.display());
                (wardrobe, status)
            }
            Ok(wardrobe) => {
                let status = format!("{} garments loaded", wardrobe.len());
                (wardrobe, status)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load wardrobe");
                (Wardrobe::default(), format!("Wardrobe unavailable: {e}"))
            }
        };

        let thumbnails = wardrobe
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let thumb = item.image.thumbnail(THUMBNAIL_SIDE);
                let size = [thumb.width() as usize, thumb.height() as usize];
                let image = egui::ColorImage::from_rgba_unmultiplied(size, thumb.as_raw());
                let texture = cc.egui_ctx.load_texture(
                    format!("thumb-{}", item.name),
                    image,
                    egui::TextureOptions::default(),
                );
                Thumbnail {
                    index,
                    name: item.name.clone(),
                    texture,
                }
            })
            .collect();

        let controller = SessionController::from_config(Arc::new(wardrobe), &config.camera);
        Self {
            config,
            thumbnails,
            selection: controller.selection_handle(),
            controller: Some(controller),
            worker: None,
            frames: None,
            preview: None,
            status,
            opening: false,
        }
    }

    fn select(&mut self, index: usize) {
        match self.selection.select(index) {
            Ok(()) => {
                tracing::info!(index, "Garment selected");
                self.status = format!("Wearing {}", self.item_name(index));
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.status = "No garment".to_string();
    }

    fn item_name(&self, index: usize) -> &str {
        self.thumbnails
            .iter()
            .find(|t| t.index == index)
            .map(|t| t.name.as_str())
            .unwrap_or("?")
    }

    fn start_camera(&mut self) {
        let Some(controller) = self.controller.take() else {
            return;
        };

        // ffmpeg blocks until the first frame arrives, so the worker opens it.
        let (tx, rx) = frame_slot();
        match PreviewWorker::launch(controller, tx, self.config.camera.tick_interval()) {
            Ok(worker) => {
                self.status = "Opening camera...".to_string();
                self.opening = true;
                self.worker = Some(worker);
                self.frames = Some(rx);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn preview worker");
                self.status = format!("Preview failed: {e}");
            }
        }
    }

    fn reclaim_finished_worker(&mut self) {
        if !self.worker.as_ref().is_some_and(|w| w.is_finished()) {
            return;
        }
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.opening = false;
        self.status = match worker.take_failure() {
            Some(e @ FitroomError::SourceUnavailable { .. }) => format!("Camera unavailable: {e}"),
            Some(e) => e.to_string(),
            None => "Camera stopped".to_string(),
        };
        self.controller = worker.stop();
        self.frames = None;
    }

    fn poll_frames(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.frames.as_mut().and_then(|rx| rx.take_new()) else {
            return;
        };
        let image = to_color_image(&frame);
        match self.preview.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.preview =
                    Some(ctx.load_texture("preview", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn stats_line(&self) -> Option<String> {
        let worker = self.worker.as_ref()?;
        let stats = worker.stats();
        Some(format!(
            "shown {} · composited {} · missed {} ({:.1}%)",
            stats.frames_shown,
            stats.frames_composited,
            stats.frames_unavailable,
            stats.unavailable_rate()
        ))
    }
}

fn to_color_image(frame: &Frame) -> egui::ColorImage {
    let size = [frame.width() as usize, frame.height() as usize];
    egui::ColorImage::from_rgb(size, frame.as_raw())
}

impl eframe::App for TrialRoomApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_frames(ctx);

        self.reclaim_finished_worker();
        if self.opening && self.worker.as_ref().is_some_and(|w| w.stats().started_at.is_some()) {
            self.opening = false;
            self.status = "Camera running".to_string();
        }
        if self.worker.is_some() {
            ctx.request_repaint_after(self.config.camera.tick_interval());
        }

        egui::SidePanel::left("wardrobe")
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Wardrobe");
                ui.separator();

                let mut clicked = None;
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for thumb in &self.thumbnails {
                        let size = thumb.texture.size_vec2();
                        let image = egui::load::SizedTexture::new(thumb.texture.id(), size);
                        let button = egui::ImageButton::new(image)
                            .selected(self.selection.current() == Some(thumb.index));
                        if ui.add(button).on_hover_text(thumb.name.as_str()).clicked() {
                            clicked = Some(thumb.index);
                        }
                    }
                });
                if let Some(index) = clicked {
                    self.select(index);
                }

                ui.separator();
                if ui.button("None").clicked() {
                    self.clear_selection();
                }
            });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let start = egui::Button::new("Start Camera")
                    .fill(Color32::from_rgb(52, 120, 200))
                    .stroke(egui::Stroke::new(1.0, Color32::from_rgb(120, 170, 230)));
                if ui.add_enabled(self.controller.is_some(), start).clicked() {
                    self.start_camera();
                }

                match self.selection.state() {
                    PreviewState::Idle => ui.label("Idle"),
                    PreviewState::Previewing { index } => ui.colored_label(
                        Color32::from_rgb(120, 220, 140),
                        format!("Previewing {}", self.item_name(index)),
                    ),
                };
            });
            ui.label(format!("Status: {}", self.status));
            if let Some(line) = self.stats_line() {
                ui.label(line);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.preview.as_ref() {
            Some(texture) => {
                let available = ui.available_size();
                let size = texture.size_vec2();
                let scale = (available.x / size.x).min(available.y / size.y).min(1.0);
                ui.centered_and_justified(|ui| {
                    ui.image(egui::load::SizedTexture::new(texture.id(), size * scale));
                });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("Press \"Start Camera\" to begin the preview");
                });
            }
        });
    }
}
