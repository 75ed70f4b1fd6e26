//! yolt2tfrecord: convert YOLT/YOLO bounding-box annotations into TFRecord
//! training data for object-detection pipelines.
//!
//! For each image the converter reads the encoded bytes, parses the
//! matching normalized-coordinate label file, remaps class ids into the
//! label map's id space, and serializes one `tf.train.Example` per image
//! into a TFRecord container, optionally holding out a shuffled validation
//! fraction.
//!
//! # Modules
//!
//! - [`label_map`]: `.pbtxt` label maps and class-id remap tables
//! - [`labels`]: bounding-box label file parsing
//! - [`bbox`]: typed normalized/pixel bounding boxes
//! - [`image`]: image bytes, dimensions, and content hashing
//! - [`example`]: `tf.train.Example` schema assembly
//! - [`tfrecord`]: record container framing
//! - [`convert`]: list/directory conversion drivers

pub mod bbox;
pub mod convert;
pub mod error;
pub mod example;
pub mod image;
pub mod label_map;
pub mod labels;
pub mod tfrecord;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::ConvertError;

use convert::SplitOptions;
use label_map::{ClassRemap, LabelMap};

/// The yolt2tfrecord CLI application.
#[derive(Parser)]
#[command(name = "yolt2tfrecord")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert labeled images into TFRecord containers.
    Convert(ConvertArgs),
    /// Convert an unlabeled image list into image-only records.
    Images(ImagesArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Image-list file (one path per line) or dataset root directory.
    input: PathBuf,

    /// Label map (.pbtxt) giving class names; ids must start at 1.
    #[arg(long, value_name = "PBTXT")]
    label_map: PathBuf,

    /// Output TFRecord path.
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Output TFRecord path for held-out validation records.
    #[arg(long)]
    output_val: Option<PathBuf>,

    /// Fraction of records to hold out for validation.
    #[arg(long, default_value_t = 0.0, requires = "output_val")]
    val_frac: f64,

    /// Seed for the validation shuffle; omit for a nondeterministic split.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON remap table from raw class ids to label-map ids.
    #[arg(long, value_name = "JSON", conflicts_with = "remap_shift")]
    remap: Option<PathBuf>,

    /// Uniform shift added to every raw class id (e.g. 1 for 0-based labels).
    #[arg(long, value_name = "DELTA")]
    remap_shift: Option<i64>,
}

/// Arguments for the images subcommand.
#[derive(clap::Args)]
struct ImagesArgs {
    /// Image-list file, one path per line.
    input: PathBuf,

    /// Output TFRecord path.
    #[arg(long, short = 'o')]
    output: PathBuf,
}

/// Run the yolt2tfrecord CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ConvertError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Images(args)) => run_images(args),
        None => {
            println!("yolt2tfrecord {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert YOLT/YOLO bounding-box labels into TFRecord training data.");
            println!();
            println!("Run 'yolt2tfrecord --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), ConvertError> {
    let label_map = LabelMap::from_file(&args.label_map)?;

    let remap = match (&args.remap, args.remap_shift) {
        (Some(path), _) => ClassRemap::from_json_file(path)?,
        (None, Some(delta)) => ClassRemap::shift(delta),
        (None, None) => ClassRemap::default(),
    };

    let split = SplitOptions {
        output: args.output,
        output_val: args.output_val,
        val_frac: args.val_frac,
        seed: args.seed,
    };

    let counts = if args.input.is_dir() {
        convert::convert_image_dir(&args.input, &label_map, &remap, &split)?
    } else {
        convert::convert_image_list(&args.input, &label_map, &remap, &split)?
    };

    println!(
        "{} record(s) written ({} train, {} validation)",
        counts.total(),
        counts.train,
        counts.val
    );
    Ok(())
}

/// Execute the images subcommand.
fn run_images(args: ImagesArgs) -> Result<(), ConvertError> {
    let written = convert::convert_unlabeled_list(&args.input, &args.output)?;
    println!("{written} record(s) written");
    Ok(())
}
