//! Batch alignment of every pair in the input directory.
//!
//! Pairs are processed one at a time in sorted order. Per-pair problems are
//! logged with the pair id and recorded in the [`BatchSummary`]; only discovery
//! and calibration loading errors stop a run.

use std::path::Path;

use crate::calibrate::Calibrator;
use crate::capture::CaptureSurface;
use crate::config::AlignConfig;
use crate::dataset::{discover_pairs, ImagePair, PairEntry};
use crate::error::CoregResult;
use crate::store::{CalibrationStore, MemoryStore};
use crate::strategy::AlignmentStrategy;

/// What happened to one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairStatus {
    /// Aligned with a calibration.
    Calibrated,
    /// Aligned with the uncalibrated center fit.
    Fallback,
    /// The operator skipped the pair.
    Skipped,
    /// No sensor image was found.
    MissingSensor,
    /// The pair could not be processed.
    Failed(String),
}

/// Outcome of one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairReport {
    /// Base name of the pair.
    pub id: String,
    /// What happened to it.
    pub status: PairStatus,
}

/// Totals of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Pairs aligned with a calibration.
    pub calibrated: usize,
    /// Pairs aligned with the center fit.
    pub fallback: usize,
    /// Pairs skipped by the operator.
    pub skipped: usize,
    /// Pairs without a sensor image.
    pub missing_sensor: usize,
    /// Pairs that failed.
    pub failed: usize,
    /// One report per pair, in processing order.
    pub reports: Vec<PairReport>,
}

impl BatchSummary {
    fn push(&mut self, id: &str, status: PairStatus) {
        match &status {
            PairStatus::Calibrated => self.calibrated += 1,
            PairStatus::Fallback => self.fallback += 1,
            PairStatus::Skipped => self.skipped += 1,
            PairStatus::MissingSensor => self.missing_sensor += 1,
            PairStatus::Failed(_) => self.failed += 1,
        }
        self.reports.push(PairReport {
            id: id.to_string(),
            status,
        });
    }

    /// Number of pairs seen.
    pub fn total(&self) -> usize {
        self.reports.len()
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pairs: {} calibrated, {} fallback, {} skipped, {} missing sensor, {} failed",
            self.total(),
            self.calibrated,
            self.fallback,
            self.skipped,
            self.missing_sensor,
            self.failed
        )
    }
}

/// Aligns all pairs of `config.input_dir` into `config.output_dir`.
#[derive(Debug, Clone)]
pub struct BatchPipeline {
    config: AlignConfig,
}

impl BatchPipeline {
    /// Create a pipeline for the given configuration.
    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }

    /// The configuration of this pipeline.
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Align every pair with the stored calibration, or the center fit when none exists.
    ///
    /// # Errors
    ///
    /// Fails if the calibration cannot be decoded, the input directory holds no
    /// pairs or the output directory cannot be created.
    pub fn run_calibrated<C: CalibrationStore + ?Sized>(
        &self,
        store: &C,
    ) -> CoregResult<BatchSummary> {
        let record = store.load(&self.config.calibration_name)?;
        match &record {
            Some(record) => log::info!(
                "using calibration '{}' (scale {})",
                self.config.calibration_name,
                record.scale_factor
            ),
            None => log::warn!(
                "no calibration '{}' found, falling back to center fit",
                self.config.calibration_name
            ),
        }

        let strategy = AlignmentStrategy::from_record(record.as_ref());
        self.run_with(|_| Ok(Some(strategy.clone())))
    }

    /// Align every pair with a calibration captured on that pair.
    ///
    /// Skipped pairs keep their reference copy but get no aligned output.
    pub fn run_interactive<S: CaptureSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> CoregResult<BatchSummary> {
        let calibrator = Calibrator::per_pair().with_marker_radius(self.config.marker_radius);

        self.run_with(|pair| {
            log::info!("capture points for {}", pair.id);
            let record = calibrator.calibrate(&mut *surface, &pair.reference, &pair.sensor)?;
            let Some(record) = record else {
                return Ok(None);
            };

            // the record lives only as long as this pair
            let mut store = MemoryStore::new();
            store.save(&pair.id, &record)?;
            Ok(store.load(&pair.id)?.as_ref().map(AlignmentStrategy::from))
        })
    }

    /// Process every pair, asking `select` for the strategy of each loaded pair.
    ///
    /// `select` returning `Ok(None)` marks the pair as skipped.
    pub fn run_with<F>(&self, mut select: F) -> CoregResult<BatchSummary>
    where
        F: FnMut(&ImagePair) -> CoregResult<Option<AlignmentStrategy>>,
    {
        let entries = discover_pairs(&self.config)?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut summary = BatchSummary::default();
        for (i, entry) in entries.iter().enumerate() {
            log::info!("[{}/{}] {}", i + 1, entries.len(), entry.id);
            let status = self.process(entry, &mut select);
            if let PairStatus::Failed(reason) = &status {
                log::error!("{}: {reason}", entry.id);
            }
            summary.push(&entry.id, status);
        }

        log::info!("{summary}");
        Ok(summary)
    }

    fn process<F>(&self, entry: &PairEntry, select: &mut F) -> PairStatus
    where
        F: FnMut(&ImagePair) -> CoregResult<Option<AlignmentStrategy>>,
    {
        let output_dir = self.config.output_dir.as_path();

        if let Err(e) = copy_reference(entry, output_dir) {
            return PairStatus::Failed(format!("copying reference: {e}"));
        }

        if entry.sensor_path.is_none() {
            log::warn!("{}: no sensor image, skipping", entry.id);
            return PairStatus::MissingSensor;
        }

        let pair = match ImagePair::load(entry) {
            Ok(pair) => pair,
            Err(e) => return PairStatus::Failed(format!("reading images: {e}")),
        };

        let strategy = match select(&pair) {
            Ok(Some(strategy)) => strategy,
            Ok(None) => {
                log::info!("{}: skipped", entry.id);
                return PairStatus::Skipped;
            }
            Err(e) => return PairStatus::Failed(e.to_string()),
        };

        let result = match strategy.align(pair.reference.size(), &pair.sensor) {
            Ok(result) => result,
            Err(e) => return PairStatus::Failed(format!("aligning: {e}")),
        };

        let out_path = entry.aligned_output(output_dir, &self.config.aligned_suffix);
        let quality = self.config.jpeg_quality;
        if let Err(e) = coreg_io::write_image_rgb8(&out_path, &result.image, quality) {
            return PairStatus::Failed(format!("writing {}: {e}", out_path.display()));
        }
        log::info!("{}: wrote {}", entry.id, out_path.display());

        if result.fallback {
            PairStatus::Fallback
        } else {
            PairStatus::Calibrated
        }
    }
}

/// Copy the reference file verbatim unless a copy already exists.
fn copy_reference(entry: &PairEntry, output_dir: &Path) -> std::io::Result<()> {
    let dst = entry.reference_output(output_dir);
    if dst.exists() {
        log::debug!("{} already present", dst.display());
        return Ok(());
    }
    std::fs::copy(&entry.reference_path, &dst)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts() {
        let mut summary = BatchSummary::default();
        summary.push("a", PairStatus::Calibrated);
        summary.push("b", PairStatus::Failed("boom".into()));
        summary.push("c", PairStatus::MissingSensor);
        summary.push("d", PairStatus::Calibrated);

        assert_eq!(summary.calibrated, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.missing_sensor, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(
            summary.to_string(),
            "4 pairs: 2 calibrated, 0 fallback, 0 skipped, 1 missing sensor, 1 failed"
        );
    }
}
