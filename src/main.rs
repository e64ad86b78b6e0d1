//! qr-overlay - QR detection overlay for a camera preview
//!
//! Feeds frames to a pre-built QR detector, freezes the preview on the
//! annotated frame and places tappable hotspots over each detected code,
//! correctly positioned in a letterboxed or cropped view.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use qr_overlay::app::{Interaction, ScannerApp};
use qr_overlay::capture::ImageSequenceSource;
use qr_overlay::config::{self, AppConfig};
use qr_overlay::overlay::Orientation;
use qr_overlay::session::SharedForwarder;
use qr_overlay::storage;
use qr_overlay::vision::RqrrDetector;

/// qr-overlay - QR detection overlay for camera frames
#[derive(Parser, Debug)]
#[command(name = "qr-overlay")]
#[command(about = "Detect QR codes in a frame feed and map them onto a preview layout")]
struct Args {
    /// Image files or directories replayed as camera frames
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measured width of the preview view
    #[arg(long)]
    view_width: Option<u32>,

    /// Measured height of the preview view
    #[arg(long)]
    view_height: Option<u32>,

    /// Orientation correction between frame and preview
    #[arg(long, value_enum)]
    orientation: Option<Orientation>,

    /// Minimum milliseconds between detector calls
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Dismiss a shown result after this many milliseconds
    #[arg(long, default_value = "1000")]
    dismiss_after_ms: u64,

    /// Tap every marker when several codes are found
    #[arg(long)]
    tap_all: bool,

    /// Save each frozen result frame as PNG (defaults to the data directory)
    #[arg(long, num_args = 0..=1)]
    save_results: Option<Option<PathBuf>>,

    /// Restart the frame sequence when it runs out
    #[arg(long)]
    loop_frames: bool,

    /// Print forwarded content as JSON lines
    #[arg(long)]
    json: bool,

    /// Write the effective configuration to the config file and continue
    #[arg(long)]
    write_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("qr-overlay starting...");

    let mut config = load_or_create_config(args.config.as_deref());
    apply_overrides(&mut config, &args);

    if args.write_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => config::default_config_path()?,
        };
        config::save_config(&config, &path)?;
        info!("Wrote configuration to {:?}", path);
    }

    let save_dir = match &args.save_results {
        Some(Some(dir)) => Some(dir.clone()),
        Some(None) => Some(storage::get_data_dir()?.join("results")),
        None => None,
    };
    let interaction = Interaction {
        dismiss_after: Duration::from_millis(args.dismiss_after_ms),
        tap_all: args.tap_all,
        save_dir,
    };

    let source = ImageSequenceSource::from_inputs(&args.inputs, config.capture.clone())
        .context("Failed to open frame source")?;

    let json = args.json;
    let forwarder: SharedForwarder = Arc::new(move |content: &str| {
        if json {
            println!("{}", serde_json::json!({ "content": content }));
        } else {
            println!("{}", content);
        }
    });

    let app = ScannerApp::new(config);
    app.run(source, RqrrDetector::new(), forwarder, &interaction)?;

    info!("qr-overlay shutdown complete");
    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_create_config(explicit: Option<&Path>) -> AppConfig {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config::default_config_path().ok(),
    };

    if let Some(path) = path {
        if path.exists() {
            match config::load_config(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    return config;
                }
                Err(e) => tracing::warn!("Ignoring configuration: {:#}", e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Command-line flags take precedence over the file
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(width) = args.view_width {
        config.view.width = width;
    }
    if let Some(height) = args.view_height {
        config.view.height = height;
    }
    if let Some(orientation) = args.orientation {
        config.detection.orientation = orientation;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.detection.interval_ms = interval_ms;
    }
    if args.loop_frames {
        config.capture.loop_frames = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "qr-overlay",
            "--view-width",
            "720",
            "--orientation",
            "rotate90",
            "--interval-ms",
            "250",
            "--loop-frames",
            "frames/",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.view.width, 720);
        assert_eq!(config.view.height, 1920);
        assert_eq!(config.detection.orientation, Orientation::Rotate90);
        assert_eq!(config.detection.interval_ms, 250);
        assert!(config.capture.loop_frames);
    }

    #[test]
    fn test_save_results_without_dir() {
        let args = Args::parse_from(["qr-overlay", "a.png", "--save-results"]);
        assert_eq!(args.save_results, Some(None));

        let args = Args::parse_from(["qr-overlay", "--save-results", "out", "a.png"]);
        assert_eq!(args.save_results, Some(Some(PathBuf::from("out"))));
    }

    #[test]
    fn test_missing_explicit_config_falls_back_to_defaults() {
        let config = load_or_create_config(Some(Path::new("/nonexistent/qr-overlay.toml")));
        assert_eq!(config, AppConfig::default());
    }
}
