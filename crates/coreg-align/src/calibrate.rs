//! Turning operator clicks into a calibration record.

use coreg_image::Image;
use coreg_imgproc::resize::resize_to;

use crate::capture::{CaptureMode, CaptureOutcome, CaptureSession, CaptureSurface, MarkerStyle};
use crate::config::AlignConfig;
use crate::dataset::{discover_pairs, ImagePair};
use crate::error::{CoregError, CoregResult};
use crate::estimate::estimate_affine;
use crate::normalize::{normalized_size, scale_factor};
use crate::store::{CalibrationRecord, CalibrationStore};

/// Normalizes a pair, captures correspondences and estimates the transform.
#[derive(Debug, Clone)]
pub struct Calibrator {
    mode: CaptureMode,
    style: MarkerStyle,
}

impl Calibrator {
    /// Calibrator for a one-off bulk calibration.
    pub fn bulk() -> Self {
        Self::new(CaptureMode::Bulk)
    }

    /// Calibrator for per-pair alignment.
    pub fn per_pair() -> Self {
        Self::new(CaptureMode::PerPair)
    }

    fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            style: MarkerStyle::for_mode(mode),
        }
    }

    /// Override the radius of the capture markers. `None` keeps the default of the mode.
    pub fn with_marker_radius(mut self, radius: Option<u32>) -> Self {
        if let Some(radius) = radius {
            self.style.radius = radius;
        }
        self
    }

    /// Capture a calibration on one pair.
    ///
    /// Returns `Ok(None)` when the operator skips. In per-pair mode collinear
    /// points are rejected and the operator is asked again for the same pair.
    ///
    /// # Errors
    ///
    /// Capture validation errors, and in bulk mode
    /// [`CoregError::DegenerateCorrespondence`] for collinear points.
    pub fn calibrate<S: CaptureSurface + ?Sized>(
        &self,
        surface: &mut S,
        reference: &Image<u8, 3>,
        sensor: &Image<u8, 3>,
    ) -> CoregResult<Option<CalibrationRecord>> {
        let scale = scale_factor(reference.height(), sensor.height())?;
        let resized_size = normalized_size(sensor.size(), reference.height(), scale);
        let resized = resize_to(sensor, resized_size)?;
        log::debug!(
            "sensor {} resized to {} (scale {scale})",
            sensor.size(),
            resized_size
        );

        let mut session = CaptureSession::new(self.mode).with_style(self.style);
        loop {
            let points = match session.run(surface, reference, &resized)? {
                CaptureOutcome::Points(points) => points,
                CaptureOutcome::Aborted => return Ok(None),
            };

            match estimate_affine(points.pairs()) {
                Ok(transform) => {
                    log::info!("estimated affine transform {:?}", transform.matrix);
                    return Ok(Some(CalibrationRecord::new(
                        transform,
                        scale,
                        sensor.size(),
                        reference.size(),
                        points,
                    )));
                }
                Err(CoregError::DegenerateCorrespondence(src))
                    if self.mode == CaptureMode::PerPair =>
                {
                    log::warn!("sensor points {src:?} are collinear, pick three new points");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Run a bulk calibration on the first complete pair of the input directory and save it.
///
/// Returns the saved record, or `None` if the operator skipped.
pub fn run_calibration<S, C>(
    config: &AlignConfig,
    surface: &mut S,
    store: &mut C,
) -> CoregResult<Option<CalibrationRecord>>
where
    S: CaptureSurface + ?Sized,
    C: CalibrationStore + ?Sized,
{
    let entries = discover_pairs(config)?;
    let entry = entries
        .iter()
        .find(|entry| entry.sensor_path.is_some())
        .ok_or_else(|| CoregError::NoInputPairs {
            dir: config.input_dir.clone(),
            suffix: config.sensor_suffix.clone(),
        })?;

    log::info!("calibrating on pair {}", entry.id);
    let pair = ImagePair::load(entry)?;

    let calibrator = Calibrator::bulk().with_marker_radius(config.marker_radius);
    let Some(record) = calibrator.calibrate(surface, &pair.reference, &pair.sensor)? else {
        log::warn!("calibration aborted, nothing saved");
        return Ok(None);
    };

    store.save(&config.calibration_name, &record)?;
    Ok(Some(record))
}
