//! Fitroom CLI: inspect wardrobes and exercise the compositor without a window.
//!
//! Usage:
//!   fitroom-cli wardrobe <DIR>                        List garments in a directory
//!   fitroom-cli composite --frame F --cloth C -o OUT  Composite a still image
//!   fitroom-cli snapshot --item N -o OUT              Save one live preview frame
//!   fitroom-cli check [--write-config]                Check camera and configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "fitroom-cli",
    about = "Virtual cloth trial room tools",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the garments a directory would provide
    Wardrobe {
        /// Directory holding RGBA garment images
        dir: PathBuf,
    },

    /// Overlay a garment onto a still image
    Composite {
        /// Background image (any format the image crate decodes)
        #[arg(long)]
        frame: PathBuf,

        /// Garment image with alpha channel
        #[arg(long)]
        cloth: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Composite at the frame's own size instead of the configured camera size
        #[arg(long)]
        keep_size: bool,
    },

    /// Run the preview loop until one frame is shown and save it
    Snapshot {
        /// Wardrobe index to overlay
        #[arg(long)]
        item: Option<usize>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Use the synthetic test pattern instead of the camera
        #[arg(long)]
        synthetic: bool,

        /// Wardrobe directory (defaults to the configured one)
        #[arg(long)]
        wardrobe: Option<PathBuf>,

        /// Ticks to attempt before giving up
        #[arg(long, default_value = "200")]
        max_ticks: u32,
    },

    /// Check camera availability and configuration
    Check {
        /// Write the effective configuration to the config file
        #[arg(long)]
        write_config: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = fitroom_common::config::AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    fitroom_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Wardrobe { dir } => commands::wardrobe::run(&config, dir),
        Commands::Composite {
            frame,
            cloth,
            output,
            keep_size,
        } => commands::composite::run(&config, frame, cloth, output, keep_size),
        Commands::Snapshot {
            item,
            output,
            synthetic,
            wardrobe,
            max_ticks,
        } => commands::snapshot::run(config, item, output, synthetic, wardrobe, max_ticks),
        Commands::Check { write_config } => commands::check::run(&config, write_config),
    }
}
