use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yolt2tfrecord operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read dimensions of {path}: {source}")]
    ImageDimensions {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Unrecognized image extension for {path}")]
    ImageFormatUnknown { path: PathBuf },

    #[error("Failed to parse label map {path}, line {line}: {message}")]
    LabelMapParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid label map {path}: {message}")]
    LabelMapInvalid { path: PathBuf, message: String },

    #[error("Failed to parse label file {path}, line {line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to parse remap table {path}: {source}")]
    RemapParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid remap table {path}: {message}")]
    RemapInvalid { path: PathBuf, message: String },

    #[error("Class id {class_id} ({path}, line {line}) has no remap entry")]
    RemapMissingClass {
        class_id: i64,
        path: PathBuf,
        line: usize,
    },

    #[error("Class id {class_id} ({path}, line {line}) is not in the label map")]
    UnknownClass {
        class_id: i64,
        path: PathBuf,
        line: usize,
    },

    #[error("Invalid input layout at {path}: {message}")]
    LayoutInvalid { path: PathBuf, message: String },

    #[error("Validation fraction {value} is out of range [0.0, 1.0)")]
    InvalidValFraction { value: f64 },

    #[error("Corrupt record container at byte {offset}: {message}")]
    RecordCorrupt { offset: u64, message: String },
}
