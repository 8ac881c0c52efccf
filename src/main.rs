// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use facecapture::config::Config;
use facecapture::i18n;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "facecapture")]
#[command(about = "Face check-in capture screen")]
#[command(version = facecapture::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file (default: ~/.config/facecapture/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the check-in screen in the terminal (default)
    Terminal,

    /// List available cameras
    List,

    /// Capture a single check-in photo
    Capture {
        /// Output file or directory (default: ~/Pictures/FaceCapture)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the face-frame cutout for a viewport
    Geometry {
        #[arg(long)]
        width: f32,

        #[arg(long)]
        height: f32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=facecapture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match cli.command {
        Some(Commands::List) => cli::list_cameras(&config),
        Some(Commands::Capture { output }) => cli::capture_photo(&config, output),
        Some(Commands::Geometry { width, height }) => cli::print_geometry(&config, width, height),
        Some(Commands::Terminal) | None => facecapture::terminal::run(config),
    }
}
