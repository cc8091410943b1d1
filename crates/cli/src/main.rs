mod detector;
mod logging;
mod snapshot;

use anyhow::{Context, Result};
use clap::Parser;
use image::DynamicImage;
use scanview_core::ui::{self, ViewfinderEvent};
use scanview_core::{Config, RoiRect, image_processing::ImageProcessor, init};
use snapshot::{Gesture, SnapshotRequest};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::info;

/// Size of the viewfinder when no frame dictates it.
const DEFAULT_SIZE: (u32, u32) = (960, 540);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Still frame shown behind the overlay
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Override the display density from .env
    #[arg(short, long)]
    density: Option<f32>,

    /// Draw a dashed outline instead of shading outside the scan window
    #[arg(long, default_value_t = false)]
    outline_only: bool,

    /// Render the overlay into this PNG instead of opening a window
    #[arg(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,

    /// Snapshot width; defaults to the frame width
    #[arg(long)]
    width: Option<u32>,

    /// Snapshot height; defaults to the frame height
    #[arg(long)]
    height: Option<u32>,

    /// Snapshot without the crop handle
    #[arg(long, default_value_t = false)]
    hide_handle: bool,

    /// Snapshot after tapping the handle
    #[arg(long, default_value_t = false, conflicts_with = "drag_to")]
    tap: bool,

    /// Snapshot after dragging the handle to X Y
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    drag_to: Option<Vec<f32>>,

    /// Do not start the simulated detector
    #[arg(long, default_value_t = false)]
    no_detector: bool,

    /// Enable debug logging (RUST_LOG is honoured)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Setup
    let args = Args::parse();
    logging::init(args.verbose);
    init();

    // Load config and apply command line overrides
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(d) = args.density {
        config.density = d;
    }
    if args.outline_only {
        config.set_outline_only(true);
    }
    config.validate().context("Invalid command line overrides")?;

    let frame = match &args.image {
        Some(path) => Some(ImageProcessor::load_frame(path).context("Failed to load frame")?),
        None => None,
    };

    match &args.snapshot {
        Some(path) => run_snapshot(&args, &config, frame.as_ref(), path),
        None => run_interactive(&args, config, frame),
    }
}

fn run_snapshot(
    args: &Args,
    config: &Config,
    frame: Option<&DynamicImage>,
    path: &Path,
) -> Result<()> {
    let frame_size = frame.map(|f| (f.width(), f.height()));
    let (default_w, default_h) = frame_size.unwrap_or(DEFAULT_SIZE);
    let width = args.width.unwrap_or(default_w);
    let height = args.height.unwrap_or(default_h);
    anyhow::ensure!(width > 0 && height > 0, "Snapshot size must be positive");

    let gesture = match (&args.drag_to, args.tap) {
        (Some(to), _) => Gesture::DragTo(to[0], to[1]),
        (None, true) => Gesture::Tap,
        (None, false) => Gesture::None,
    };

    let request = SnapshotRequest {
        width,
        height,
        show_handle: !args.hide_handle,
        gesture,
        with_marks: !args.no_detector,
        frame,
    };
    let roi = snapshot::write(config, &request, path)?;
    report_window(
        roi,
        (width as f32, height as f32),
        frame_size.unwrap_or((width, height)),
    );
    println!("{}", path.display());
    Ok(())
}

fn run_interactive(args: &Args, config: Config, frame: Option<DynamicImage>) -> Result<()> {
    let frame_size = frame
        .as_ref()
        .map_or(DEFAULT_SIZE, |f| (f.width(), f.height()));

    let (events_tx, events_rx) = mpsc::channel();
    // Replaced by the real bounds on the first layout
    let initial = RoiRect::new(0, 0, DEFAULT_SIZE.0 as i32, DEFAULT_SIZE.1 as i32);
    let scan_window = if args.no_detector {
        None
    } else {
        Some(detector::spawn(events_tx, initial))
    };

    let session = ui::run_viewfinder(config, frame, events_rx, move |event| {
        if let ViewfinderEvent::RoiApplied(roi) = event {
            info!(?roi, "scan window applied");
        }
        if let Some(window) = &scan_window {
            window.send_modify(|area| area.apply(event));
        }
    })?;

    match session {
        Some(session) => {
            let roi = session.roi.unwrap_or_default();
            let ui_size = session
                .screen_size
                .map_or((frame_size.0 as f32, frame_size.1 as f32), |s| (s.x, s.y));
            report_window(roi, ui_size, frame_size);
        }
        None => println!("Crop handle not used; scanning the full frame."),
    }
    Ok(())
}

/// Prints the scan window in frame pixels.
fn report_window(roi: RoiRect, ui_size: (f32, f32), frame_size: (u32, u32)) {
    match ImageProcessor::map_roi(roi, ui_size, frame_size) {
        Some(w) => println!("Scan window: {}x{} at ({}, {})", w.width, w.height, w.x, w.y),
        None => println!("Scan window lies outside the frame."),
    }
}
