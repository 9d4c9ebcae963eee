//! imgvis: annotation overlays and cross-frame annotation combination.
//!
//! imgvis draws annotations (bounding boxes, polygons, segmentation masks
//! and classification labels) onto the images of an annotation stream, and
//! combines the object detections of successive frames into one cumulative
//! set by matching their polygons.
//!
//! # Modules
//!
//! - [`ir`]: data model (objects, images, stream elements) and JSON streams
//! - [`colors`]: per-label color assignment
//! - [`shape`], [`mask`], [`text`]: turning annotations into drawable parts
//! - [`render`]: the overlay renderer
//! - [`matching`]: polygon IoU, matching and set operations
//! - [`stages`]: the stream stages built from the above
//! - [`error`]: error types

pub mod codec;
pub mod colors;
pub mod error;
pub mod font;
pub mod ir;
pub mod mask;
pub mod matching;
pub mod render;
pub mod shape;
pub mod stages;
pub mod text;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use serde::de::DeserializeOwned;

pub use error::ImgvisError;

use font::SystemFonts;
use ir::io_json::{self, ClassificationRecord, DetectionRecord, SegmentationRecord};
use ir::{
    ClassificationInstance, IndexMatrix, ObjectDetectionInstance, SegmentationAnnotation,
    SegmentationInstance, SegmentationLayers,
};
use stages::{Processor, Sink};

/// Name of the file `combine-od` writes the combined annotations to.
pub const COMBINED_FILE_NAME: &str = "combined.json";

/// Name of the canvas file `overlay-sink` writes by default.
pub const OVERLAY_FILE_NAME: &str = "overlay.png";

/// The imgvis CLI application.
#[derive(Parser)]
#[command(name = "imgvis")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands, one per stage.
#[derive(Subcommand)]
enum Commands {
    /// Draw object detections onto their images.
    OverlayOd(StageArgs),
    /// Draw segmentation masks onto their images.
    OverlayIs(StageArgs),
    /// Write classification labels onto their images.
    OverlayIc(StageArgs),
    /// Draw the outlines of all object detections onto a single canvas.
    OverlaySink(StageArgs),
    /// Combine the object detections of successive frames.
    CombineOd(StageArgs),
}

/// Arguments shared by all stages.
#[derive(clap::Args)]
struct StageArgs {
    /// JSON stream file listing the elements.
    input: PathBuf,

    /// Directory the image file names are relative to.
    #[arg(long)]
    images: PathBuf,

    /// Directory to write the results to.
    #[arg(long)]
    output: PathBuf,

    /// YAML file with stage options.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Run the imgvis CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ImgvisError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::OverlayOd(args)) => run_overlay_od(args),
        Some(Commands::OverlayIs(args)) => run_overlay_is(args),
        Some(Commands::OverlayIc(args)) => run_overlay_ic(args),
        Some(Commands::OverlaySink(args)) => run_overlay_sink(args),
        Some(Commands::CombineOd(args)) => run_combine_od(args),
        None => {
            println!("imgvis {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Annotation overlays and cross-frame annotation combination.");
            println!();
            println!("Run 'imgvis --help' for usage information.");
            Ok(())
        }
    }
}

/// Loads stage options from a YAML file, or the defaults without one.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_options<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, ImgvisError> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ImgvisError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn detection_elements(
    args: &StageArgs,
) -> Result<impl Iterator<Item = Result<ObjectDetectionInstance, ImgvisError>> + '_, ImgvisError> {
    let records: Vec<DetectionRecord> = io_json::read_stream(&args.input)?;
    Ok(records.into_iter().map(move |record| {
        Ok(ObjectDetectionInstance {
            image: codec::load_image(&args.images, &record.file_name)?,
            annotations: record.objects,
        })
    }))
}

fn run_overlay_od(args: StageArgs) -> Result<(), ImgvisError> {
    let options: stages::OverlayOdOptions = load_options(args.config.as_deref())?;
    let mut stage = stages::OverlayOd::new(options, &SystemFonts::default())?;
    fs::create_dir_all(&args.output)?;

    let mut count = 0;
    for element in detection_elements(&args)? {
        let output = stage.process(element?)?;
        codec::save_image(&args.output, &output.image)?;
        count += 1;
    }
    info!("Rendered {} image(s) to {}", count, args.output.display());
    Ok(())
}

fn run_overlay_is(args: StageArgs) -> Result<(), ImgvisError> {
    let options: stages::OverlayIsOptions = load_options(args.config.as_deref())?;
    let mut stage = stages::OverlayIs::new(options)?;
    fs::create_dir_all(&args.output)?;

    let records: Vec<SegmentationRecord> = io_json::read_stream(&args.input)?;
    let count = records.len();
    for record in records {
        let element = SegmentationInstance {
            image: codec::load_image(&args.images, &record.file_name)?,
            annotations: SegmentationAnnotation {
                labels: record.labels,
                layers: SegmentationLayers::Indexed(IndexMatrix::from_rows(&record.indices)?),
            },
        };
        let output = stage.process(element)?;
        codec::save_image(&args.output, &output.image)?;
    }
    info!("Rendered {} image(s) to {}", count, args.output.display());
    Ok(())
}

fn run_overlay_ic(args: StageArgs) -> Result<(), ImgvisError> {
    let options: stages::OverlayIcOptions = load_options(args.config.as_deref())?;
    let mut stage = stages::OverlayIc::new(options, &SystemFonts::default())?;
    fs::create_dir_all(&args.output)?;

    let records: Vec<ClassificationRecord> = io_json::read_stream(&args.input)?;
    let count = records.len();
    for record in records {
        let element = ClassificationInstance {
            image: codec::load_image(&args.images, &record.file_name)?,
            label: record.label,
        };
        let output = stage.process(element)?;
        codec::save_image(&args.output, &output.image)?;
    }
    info!("Rendered {} image(s) to {}", count, args.output.display());
    Ok(())
}

fn run_overlay_sink(args: StageArgs) -> Result<(), ImgvisError> {
    let mut options: stages::OverlaySinkOptions = load_options(args.config.as_deref())?;
    if options.output == stages::OverlaySinkOptions::default().output {
        options.output = args.output.join(OVERLAY_FILE_NAME);
    }
    let mut sink = stages::OverlaySink::new(options)?;
    for element in detection_elements(&args)? {
        sink.consume(&element?)?;
    }
    sink.finish()
}

fn run_combine_od(args: StageArgs) -> Result<(), ImgvisError> {
    let options: stages::CombineOdOptions = load_options(args.config.as_deref())?;
    let mut stage = stages::CombineOd::new(options);
    fs::create_dir_all(&args.output)?;

    let mut combined = Vec::new();
    for element in detection_elements(&args)? {
        let output = stage.process(element?)?;
        combined.push(DetectionRecord {
            file_name: output.image.file_name,
            objects: output.annotations,
        });
    }
    let path = args.output.join(COMBINED_FILE_NAME);
    io_json::write_stream(&path, combined)?;
    info!("Wrote combined annotations to {}", path.display());
    Ok(())
}
