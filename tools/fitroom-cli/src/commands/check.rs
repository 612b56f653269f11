//! Check camera availability and configuration.

use fitroom_capture::{command_exists, detect_webcam_devices};
use fitroom_common::config::{config_file_path, AppConfig, SourceKind};
use fitroom_session::Wardrobe;

pub fn run(config: &AppConfig, write_config: bool) -> anyhow::Result<()> {
    println!("Fitroom System Check");
    println!("{}", "=".repeat(50));

    let path = config_file_path();
    if path.exists() {
        println!("[OK] Config: {}", path.display());
    } else {
        println!("[INFO] Config: defaults ({} not found)", path.display());
    }
    match config.validate() {
        Ok(()) => println!("[OK] Config is valid"),
        Err(e) => println!("[FAIL] {e}"),
    }

    let mut ready = true;

    if command_exists("ffmpeg") {
        println!("[OK] ffmpeg found");
    } else if config.camera.source == SourceKind::Ffmpeg {
        println!("[FAIL] ffmpeg not found in PATH");
        ready = false;
    } else {
        println!("[WARN] ffmpeg not found in PATH");
    }

    let devices = detect_webcam_devices();
    if devices.is_empty() {
        println!("[WARN] No webcam devices detected");
        if config.camera.source == SourceKind::Ffmpeg && config.camera.device.is_none() {
            ready = false;
        }
    } else {
        println!("[OK] Webcam devices: {}", devices.len());
        for device in &devices {
            println!("     {device}");
        }
    }

    match Wardrobe::load(&config.wardrobe) {
        Ok(wardrobe) if wardrobe.is_empty() => {
            println!("[FAIL] No garments in {}", config.wardrobe.dir.display());
            ready = false;
        }
        Ok(wardrobe) => {
            println!(
                "[OK] Wardrobe: {} garments ({} rejected)",
                wardrobe.len(),
                wardrobe.rejected().len()
            );
        }
        Err(e) => {
            println!("[FAIL] Wardrobe: {e}");
            ready = false;
        }
    }

    println!();
    println!("Effective configuration:");
    println!("{}", serde_json::to_string_pretty(config)?);
    if write_config {
        let written = config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        println!("Config written to {}", written.display());
    }

    println!();
    if ready {
        println!("All requirements are met. Fitroom is ready.");
    } else {
        println!("Some requirements are missing. See above for fixes.");
    }

    Ok(())
}
