use std::path::PathBuf;

use thiserror::Error;

/// Error types for the co-registration pipeline.
#[derive(Debug, Error)]
pub enum CoregError {
    /// An image could not be read, decoded or has an unusable size.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The capture session ended without enough correspondences.
    #[error("At least {required} correspondences are required on both images, got {reference} on the reference and {sensor} on the sensor")]
    InsufficientPoints {
        /// Minimum number of points required on each side
        required: usize,
        /// Points captured on the reference image
        reference: usize,
        /// Points captured on the sensor image
        sensor: usize,
    },

    /// Both images must receive the same number of clicks.
    #[error("Mismatched point count: reference ({reference}) != sensor ({sensor})")]
    MismatchedPointCount {
        /// Points captured on the reference image
        reference: usize,
        /// Points captured on the sensor image
        sensor: usize,
    },

    /// The source points are collinear, so no unique affine transform exists.
    #[error("Degenerate correspondences: source points {0:?} are collinear")]
    DegenerateCorrespondence([[f64; 2]; 3]),

    /// The input directory holds no reference images.
    #[error("No reference images matching '*{suffix}.<ext>' found in {dir}")]
    NoInputPairs {
        /// The scanned directory
        dir: PathBuf,
        /// The reference suffix searched for
        suffix: String,
    },

    /// A stored calibration record could not be decoded.
    #[error("Failed to decode calibration record {path}: {source}")]
    CalibrationDecode {
        /// Path of the corrupt record
        path: PathBuf,
        /// Underlying decoding error
        source: serde_json::Error,
    },

    /// Image processing error.
    #[error(transparent)]
    Image(#[from] coreg_image::ImageError),

    /// Image encoding/decoding error.
    #[error(transparent)]
    ImageIo(#[from] coreg_io::IoError),

    /// File system error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type CoregResult<T> = Result<T, CoregError>;
