//! List the garments in a directory.

use std::path::PathBuf;

use fitroom_common::config::{AppConfig, WardrobeConfig};
use fitroom_session::Wardrobe;

pub fn run(config: &AppConfig, dir: PathBuf) -> anyhow::Result<()> {
    let wardrobe = Wardrobe::load(&WardrobeConfig {
        dir: dir.clone(),
        extensions: config.wardrobe.extensions.clone(),
    })
    .map_err(|e| anyhow::anyhow!("Failed to load wardrobe: {e}"))?;

    println!("Wardrobe: {}", dir.display());
    println!("  Extensions: {}", config.wardrobe.extensions.join(", "));
    println!();

    if wardrobe.is_empty() {
        println!("No usable garments.");
    } else {
        println!("Garments:");
        for (index, item) in wardrobe.items().iter().enumerate() {
            let (width, height) = item.image.dimensions();
            println!("  [{index}] {} ({width}x{height})", item.name);
        }
    }

    if !wardrobe.rejected().is_empty() {
        println!();
        println!("Rejected:");
        for rejected in wardrobe.rejected() {
            println!("  {}: {}", rejected.path.display(), rejected.reason);
        }
    }

    Ok(())
}
