use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoregResult;
use crate::store::DEFAULT_CALIBRATION_NAME;

/// Settings shared by calibration and batch alignment.
///
/// Every field has a default so a partial JSON file is enough to override a
/// single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Directory scanned for image pairs.
    pub input_dir: PathBuf,
    /// Directory receiving the reference copies and aligned images.
    pub output_dir: PathBuf,
    /// Directory holding calibration records.
    pub calibration_dir: PathBuf,
    /// Name of the calibration record inside `calibration_dir`.
    pub calibration_name: String,
    /// Suffix of visible reference images, e.g. `_Z`.
    pub reference_suffix: String,
    /// Suffix of thermal sensor images, e.g. `_T`.
    pub sensor_suffix: String,
    /// Suffix of the aligned sensor images written to the output.
    pub aligned_suffix: String,
    /// File extensions accepted for input images, matched case-insensitively.
    pub extensions: Vec<String>,
    /// JPEG quality of aligned outputs.
    pub jpeg_quality: u8,
    /// Radius of the markers drawn during point capture, in display pixels.
    ///
    /// Unset keeps the default of the capture mode.
    pub marker_radius: Option<u32>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input-images"),
            output_dir: PathBuf::from("aligned-output"),
            calibration_dir: PathBuf::from("."),
            calibration_name: DEFAULT_CALIBRATION_NAME.to_string(),
            reference_suffix: "_Z".to_string(),
            sensor_suffix: "_T".to_string(),
            aligned_suffix: "_AT".to_string(),
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            jpeg_quality: 95,
            marker_radius: None,
        }
    }
}

impl AlignConfig {
    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> CoregResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
