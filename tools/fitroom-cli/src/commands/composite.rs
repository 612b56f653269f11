//! Composite a garment onto a still image.

use std::path::PathBuf;

use fitroom_common::config::AppConfig;
use fitroom_compositor::{composite_in_place, fit_frame, ClothingImage, Placement};

pub fn run(
    config: &AppConfig,
    frame_path: PathBuf,
    cloth_path: PathBuf,
    output: PathBuf,
    keep_size: bool,
) -> anyhow::Result<()> {
    let frame = image::open(&frame_path)
        .map_err(|e| anyhow::anyhow!("Failed to read frame {}: {e}", frame_path.display()))?
        .into_rgb8();
    let cloth = image::open(&cloth_path)
        .map_err(|e| anyhow::anyhow!("Failed to read garment {}: {e}", cloth_path.display()))?;
    let cloth = ClothingImage::from_dynamic(cloth)
        .map_err(|e| anyhow::anyhow!("Unusable garment {}: {e}", cloth_path.display()))?;

    let mut frame = if keep_size {
        frame
    } else {
        fit_frame(frame, config.camera.width, config.camera.height)?
    };
    let placement = composite_in_place(&mut frame, &cloth)?;

    frame
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;

    print_placement(&placement, frame.width(), frame.height());
    println!("Written: {}", output.display());
    Ok(())
}

fn print_placement(placement: &Placement, frame_width: u32, frame_height: u32) {
    println!("Frame: {frame_width}x{frame_height}");
    println!(
        "  Garment: {}x{} (scale {:.3})",
        placement.resized_width, placement.resized_height, placement.scale
    );
    println!("  Anchor: left {}, top {}", placement.left, placement.top);
    println!(
        "  Visible: {}x{}{}",
        placement.visible_width,
        placement.visible_height,
        if placement.is_clipped() { " (clipped)" } else { "" }
    );
}
