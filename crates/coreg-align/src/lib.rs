#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! The pipeline resizes the thermal image to the reference height, lets an
//! operator click three or more corresponding points, solves an affine
//! transform from the first three and warps every thermal image of a batch
//! into the frame of its visible counterpart.

/// Bulk and per-pair calibration from operator clicks.
pub mod calibrate;

/// Interactive point capture.
pub mod capture;

/// Runtime configuration.
pub mod config;

/// Point correspondence types.
pub mod correspondence;

/// Discovery and loading of image pairs.
pub mod dataset;

/// Error types for the alignment crate.
pub mod error;

/// Affine transform estimation.
pub mod estimate;

/// Resolution normalization.
pub mod normalize;

/// Batch alignment.
pub mod pipeline;

/// Calibration record persistence.
pub mod store;

/// Alignment strategies.
pub mod strategy;

pub use crate::config::AlignConfig;
pub use crate::error::{CoregError, CoregResult};
pub use crate::estimate::{estimate_affine, AffineTransform};
pub use crate::pipeline::{BatchPipeline, BatchSummary, PairReport, PairStatus};
pub use crate::store::{CalibrationRecord, CalibrationStore, JsonFileStore, MemoryStore};
pub use crate::strategy::{AlignmentResult, AlignmentStrategy};
