use std::io;
use std::path::{Path, PathBuf};

use argh::FromArgs;
use coreg::align::calibrate::run_calibration;
use coreg::align::capture::{CaptureSurface, ScriptedSurface, TerminalSurface};
use coreg::align::{AlignConfig, BatchPipeline, BatchSummary, JsonFileStore};

#[derive(FromArgs)]
/// Co-register thermal images onto their visible reference images
struct Args {
    /// path to a JSON configuration file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// directory holding the image pairs
    #[argh(option, short = 'i')]
    input_dir: Option<PathBuf>,

    /// directory receiving the reference copies and aligned images
    #[argh(option, short = 'o')]
    output_dir: Option<PathBuf>,

    /// directory holding the calibration record
    #[argh(option)]
    calibration_dir: Option<PathBuf>,

    /// JPEG quality of the aligned images
    #[argh(option)]
    jpeg_quality: Option<u8>,

    /// radius of the capture markers in pixels
    #[argh(option)]
    marker_radius: Option<u32>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Calibrate(CalibrateArgs),
    Align(AlignArgs),
    AlignInteractive(AlignInteractiveArgs),
}

#[derive(FromArgs)]
/// Capture a calibration on the first image pair and save it
#[argh(subcommand, name = "calibrate")]
struct CalibrateArgs {
    /// replay capture events from a JSON file instead of the terminal
    #[argh(option)]
    events: Option<PathBuf>,

    /// directory for the annotated preview images
    #[argh(option, default = "PathBuf::from(\"capture-preview\")")]
    preview_dir: PathBuf,
}

#[derive(FromArgs)]
/// Align every pair with the saved calibration, or center them if none exists
#[argh(subcommand, name = "align")]
struct AlignArgs {}

#[derive(FromArgs)]
/// Capture three points on every pair and align it with its own transform
#[argh(subcommand, name = "align-interactive")]
struct AlignInteractiveArgs {
    /// replay capture events from a JSON file instead of the terminal
    #[argh(option)]
    events: Option<PathBuf>,

    /// directory for the annotated preview images
    #[argh(option, default = "PathBuf::from(\"capture-preview\")")]
    preview_dir: PathBuf,
}

fn load_config(args: &Args) -> Result<AlignConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => AlignConfig::from_json_file(path)?,
        None => AlignConfig::default(),
    };

    if let Some(dir) = &args.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(dir) = &args.calibration_dir {
        config.calibration_dir = dir.clone();
    }
    if let Some(quality) = args.jpeg_quality {
        config.jpeg_quality = quality;
    }
    if let Some(radius) = args.marker_radius {
        config.marker_radius = Some(radius);
    }

    Ok(config)
}

fn open_surface(
    events: Option<&PathBuf>,
    preview_dir: &Path,
) -> Result<Box<dyn CaptureSurface>, Box<dyn std::error::Error>> {
    if let Some(path) = events {
        log::info!("replaying capture events from {}", path.display());
        return Ok(Box::new(ScriptedSurface::from_json_file(path)?));
    }

    log::info!(
        "enter points as 'a X Y' (reference) and 'b X Y' (sensor), 'help' for all commands; previews in {}",
        preview_dir.display()
    );
    Ok(Box::new(
        TerminalSurface::new(io::stdin().lock(), io::stdout()).with_preview_dir(preview_dir),
    ))
}

fn print_summary(summary: &BatchSummary) {
    println!("{summary}");
    for report in &summary.reports {
        println!("  {:<24} {:?}", report.id, report.status);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let config = load_config(&args)?;
    log::debug!("{config:?}");

    match &args.command {
        Command::Calibrate(cmd) => {
            let mut surface = open_surface(cmd.events.as_ref(), &cmd.preview_dir)?;
            let mut store = JsonFileStore::new(&config.calibration_dir);
            match run_calibration(&config, &mut surface, &mut store)? {
                Some(record) => println!(
                    "saved {} (scale {}, matrix {:?})",
                    store.record_path(&config.calibration_name).display(),
                    record.scale_factor,
                    record.matrix
                ),
                None => println!("calibration aborted"),
            }
        }
        Command::Align(_) => {
            let store = JsonFileStore::new(&config.calibration_dir);
            let summary = BatchPipeline::new(config).run_calibrated(&store)?;
            print_summary(&summary);
        }
        Command::AlignInteractive(cmd) => {
            let mut surface = open_surface(cmd.events.as_ref(), &cmd.preview_dir)?;
            let summary = BatchPipeline::new(config).run_interactive(&mut surface)?;
            print_summary(&summary);
        }
    }

    Ok(())
}
