//! Persistence of calibration records.
//!
//! A calibration is captured once and reused for every pair of a batch. Records
//! are immutable: saving under an existing name replaces the previous record.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use coreg_image::ImageSize;
use serde::{Deserialize, Serialize};

use crate::correspondence::CorrespondenceSet;
use crate::error::{CoregError, CoregResult};
use crate::estimate::AffineTransform;

/// Default name of the calibration record.
pub const DEFAULT_CALIBRATION_NAME: &str = "calibration";

/// Width and height as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSize {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl From<ImageSize> for StoredSize {
    fn from(size: ImageSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

impl From<StoredSize> for ImageSize {
    fn from(size: StoredSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

/// A persisted calibration.
///
/// `scale_factor` is the factor the sensor image was resized with before the
/// points were captured; the matrix is only valid for sensor images resized
/// with that same factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// Transform from the resized sensor frame to the reference frame.
    pub matrix: [[f64; 3]; 2],
    /// `H_reference / H_sensor` at capture time.
    pub scale_factor: f64,
    /// Native size of the sensor image used for calibration.
    pub sensor_size: StoredSize,
    /// Size of the reference image used for calibration.
    pub reference_size: StoredSize,
    /// The correspondences the matrix was solved from.
    #[serde(default)]
    pub points: CorrespondenceSet,
}

impl CalibrationRecord {
    /// Build a record from an estimated transform.
    pub fn new(
        transform: AffineTransform,
        scale_factor: f64,
        sensor_size: ImageSize,
        reference_size: ImageSize,
        points: CorrespondenceSet,
    ) -> Self {
        Self {
            matrix: transform.matrix,
            scale_factor,
            sensor_size: sensor_size.into(),
            reference_size: reference_size.into(),
            points,
        }
    }

    /// The stored matrix as a transform.
    pub fn transform(&self) -> AffineTransform {
        AffineTransform {
            matrix: self.matrix,
        }
    }
}

/// A named key/value store for calibration records.
pub trait CalibrationStore {
    /// Persist `record` under `name`, replacing any previous record.
    fn save(&mut self, name: &str, record: &CalibrationRecord) -> CoregResult<()>;

    /// Fetch the record stored under `name`.
    ///
    /// Returns `Ok(None)` when no record exists.
    fn load(&self, name: &str) -> CoregResult<Option<CalibrationRecord>>;
}

/// Stores each record as `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the record stored under `name`.
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    /// The root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CalibrationStore for JsonFileStore {
    fn save(&mut self, name: &str, record: &CalibrationRecord) -> CoregResult<()> {
        std::fs::create_dir_all(&self.root)?;

        let path = self.record_path(name);
        let tmp_path = self.root.join(format!(".{name}.json.tmp"));

        // write aside then rename so readers never see a partial record
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            serde_json::to_writer_pretty(&mut file, record)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &path)?;

        log::info!("saved calibration record to {}", path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> CoregResult<Option<CalibrationRecord>> {
        let path = self.record_path(name);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record = serde_json::from_str(&contents)
            .map_err(|source| CoregError::CalibrationDecode { path, source })?;
        Ok(Some(record))
    }
}

/// Keeps records in memory for the lifetime of one run.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, CalibrationRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CalibrationStore for MemoryStore {
    fn save(&mut self, name: &str, record: &CalibrationRecord) -> CoregResult<()> {
        self.records.insert(name.to_string(), record.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> CoregResult<Option<CalibrationRecord>> {
        Ok(self.records.get(name).cloned())
    }
}
