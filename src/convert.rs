//! Conversion drivers: image lists and dataset directories in, record
//! containers out.
//!
//! Inputs come in two shapes. An image-list file names one image path per
//! line; a dataset directory holds an `images/` tree with a sibling
//! `labels/` tree. Either way, each image's label file is derived by
//! swapping `images` path components for `labels` and the extension for
//! `.txt`. A missing label file is tolerated (the image still produces a
//! record, with empty object arrays); a missing image is an error.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use walkdir::WalkDir;

use crate::bbox::{BBoxXYXY, Normalized};
use crate::error::ConvertError;
use crate::example::{labeled_example, unlabeled_example, Example, ObjectFeatures};
use crate::image::EncodedImage;
use crate::label_map::{ClassRemap, LabelMap};
use crate::labels::read_label_file;
use crate::tfrecord::RecordWriter;

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];
const LABEL_EXTENSION: &str = "txt";

/// Where converted records go and how they are split.
#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub output: PathBuf,
    /// Second container for held-out validation records.
    pub output_val: Option<PathBuf>,
    /// Fraction of records routed to `output_val`, in `[0.0, 1.0)`.
    pub val_frac: f64,
    /// Shuffle seed; `None` draws from the thread-local RNG.
    pub seed: Option<u64>,
}

impl SplitOptions {
    fn wants_split(&self) -> bool {
        self.output_val.is_some() && self.val_frac > 0.0
    }
}

/// Record counts per output stream after a conversion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub train: u64,
    pub val: u64,
}

impl SplitCounts {
    pub fn total(&self) -> u64 {
        self.train + self.val
    }
}

/// Converts every image named in a list file (one path per line).
pub fn convert_image_list(
    list_path: &Path,
    label_map: &LabelMap,
    remap: &ClassRemap,
    split: &SplitOptions,
) -> Result<SplitCounts, ConvertError> {
    let image_paths = read_image_list(list_path)?;
    info!(
        "{}: {} image(s) listed",
        list_path.display(),
        image_paths.len()
    );
    write_labeled_records(image_paths, label_map, remap, split)
}

/// Converts every image under a dataset directory's `images/` tree.
///
/// `root` may be the dataset root containing `images/`, or the `images/`
/// directory itself.
pub fn convert_image_dir(
    root: &Path,
    label_map: &LabelMap,
    remap: &ClassRemap,
    split: &SplitOptions,
) -> Result<SplitCounts, ConvertError> {
    let images_dir = discover_images_dir(root)?;
    let image_paths = collect_image_files(&images_dir)?;
    info!(
        "{}: {} image(s) found",
        images_dir.display(),
        image_paths.len()
    );
    write_labeled_records(image_paths, label_map, remap, split)
}

/// Converts an unlabeled image list into image-only records, preserving
/// input order.
pub fn convert_unlabeled_list(list_path: &Path, output: &Path) -> Result<u64, ConvertError> {
    let image_paths = read_image_list(list_path)?;

    let mut writer = RecordWriter::create(output)?;
    for image_path in &image_paths {
        let image = EncodedImage::read(image_path)?;
        writer.write_example(&unlabeled_example(&image))?;
        debug!("{}: unlabeled record written", image_path.display());
    }
    writer.flush()?;

    info!(
        "wrote {} unlabeled record(s) to {}",
        writer.records_written(),
        output.display()
    );
    Ok(writer.records_written())
}

fn write_labeled_records(
    mut image_paths: Vec<PathBuf>,
    label_map: &LabelMap,
    remap: &ClassRemap,
    split: &SplitOptions,
) -> Result<SplitCounts, ConvertError> {
    if !(0.0..1.0).contains(&split.val_frac) {
        return Err(ConvertError::InvalidValFraction {
            value: split.val_frac,
        });
    }

    let n_val = if split.wants_split() {
        match split.seed {
            Some(seed) => image_paths.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => image_paths.shuffle(&mut rand::rng()),
        }
        (split.val_frac * image_paths.len() as f64) as usize
    } else {
        0
    };

    let mut writer = RecordWriter::create(&split.output)?;
    let mut writer_val = match &split.output_val {
        Some(path) if split.wants_split() => Some(RecordWriter::create(path)?),
        _ => None,
    };

    for (index, image_path) in image_paths.iter().enumerate() {
        let example = labeled_example_for_image(image_path, label_map, remap)?;
        match writer_val.as_mut() {
            Some(val) if index < n_val => val.write_example(&example)?,
            _ => writer.write_example(&example)?,
        }
    }

    writer.flush()?;
    if let Some(val) = writer_val.as_mut() {
        val.flush()?;
    }

    let counts = SplitCounts {
        train: writer.records_written(),
        val: writer_val
            .as_ref()
            .map(RecordWriter::records_written)
            .unwrap_or(0),
    };
    info!(
        "wrote {} train and {} validation record(s)",
        counts.train, counts.val
    );
    Ok(counts)
}

/// Builds the record for one image, tolerating a missing label file.
fn labeled_example_for_image(
    image_path: &Path,
    label_map: &LabelMap,
    remap: &ClassRemap,
) -> Result<Example, ConvertError> {
    let image = EncodedImage::read(image_path)?;

    let label_path = label_path_for_image(image_path);
    let rows = if label_path.is_file() {
        read_label_file(&label_path)?
    } else {
        warn!(
            "{}: no label file at {}, emitting empty object arrays",
            image_path.display(),
            label_path.display()
        );
        Vec::new()
    };

    let mut objects = ObjectFeatures::default();
    for row in rows {
        let mapped = remap
            .apply(row.class_id)
            .ok_or_else(|| ConvertError::RemapMissingClass {
                class_id: row.class_id,
                path: label_path.clone(),
                line: row.line,
            })?;

        let name = label_map
            .name(mapped)
            .ok_or_else(|| ConvertError::UnknownClass {
                class_id: mapped,
                path: label_path.clone(),
                line: row.line,
            })?;

        let bbox = BBoxXYXY::<Normalized>::from_cxcywh(row.cx, row.cy, row.w, row.h).clamped();
        objects.push(bbox, mapped, name);
    }

    debug!("{}: {} object(s)", image_path.display(), objects.len());
    Ok(labeled_example(&image, objects))
}

/// Derives the label path for an image by swapping `images` path components
/// for `labels` and the extension for `.txt`. Paths without an `images`
/// component fall back to a sibling `.txt` file.
pub fn label_path_for_image(image_path: &Path) -> PathBuf {
    let mut swapped = PathBuf::new();
    let mut saw_images = false;

    for component in image_path.components() {
        let part = component.as_os_str();
        if part == OsStr::new("images") {
            swapped.push("labels");
            saw_images = true;
        } else {
            swapped.push(part);
        }
    }

    let base = if saw_images {
        swapped
    } else {
        image_path.to_path_buf()
    };
    base.with_extension(LABEL_EXTENSION)
}

fn read_image_list(path: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let content = fs::read_to_string(path).map_err(ConvertError::Io)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

fn discover_images_dir(input: &Path) -> Result<PathBuf, ConvertError> {
    if !input.is_dir() {
        return Err(ConvertError::LayoutInvalid {
            path: input.to_path_buf(),
            message: "input must be a directory".to_string(),
        });
    }

    if input.join("images").is_dir() {
        Ok(input.join("images"))
    } else if is_dir_named(input, "images") {
        Ok(input.to_path_buf())
    } else {
        Err(ConvertError::LayoutInvalid {
            path: input.to_path_buf(),
            message: "expected a dataset root containing images/ or an images/ directory itself"
                .to_string(),
        })
    }
}

fn collect_image_files(images_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(images_dir).follow_links(true) {
        let entry = entry.map_err(|source| ConvertError::LayoutInvalid {
            path: images_dir.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_by_cached_key(|image_path| rel_string(images_dir, image_path));
    Ok(files)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

fn is_dir_named(path: &Path, dir_name: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.eq_ignore_ascii_case(dir_name))
        .unwrap_or(false)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
