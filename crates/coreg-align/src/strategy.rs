use coreg_image::{Image, ImageSize};
use coreg_imgproc::padding::{spatial_padding, Padding2D};
use coreg_imgproc::resize::resize_to;
use coreg_imgproc::warp::warp_affine;

use crate::error::{CoregError, CoregResult};
use crate::estimate::AffineTransform;
use crate::normalize::normalized_size;
use crate::store::CalibrationRecord;

/// How a sensor image is brought into the reference frame.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentStrategy {
    /// Resize with the calibration scale factor, then warp with the calibration matrix.
    Calibrated {
        /// Transform from the resized sensor frame to the reference frame.
        transform: AffineTransform,
        /// Scale factor recorded when the transform was captured.
        scale_factor: f64,
        /// Native sensor size seen at calibration time, if known.
        calibrated_sensor_size: Option<ImageSize>,
    },
    /// No calibration: scale to fit inside the reference and center on a black canvas.
    CenterFit,
}

/// The sensor image expressed at the reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    /// The aligned image, sized like the reference.
    pub image: Image<u8, 3>,
    /// `true` when the uncalibrated center-fit was used.
    pub fallback: bool,
}

impl From<&CalibrationRecord> for AlignmentStrategy {
    fn from(record: &CalibrationRecord) -> Self {
        AlignmentStrategy::Calibrated {
            transform: record.transform(),
            scale_factor: record.scale_factor,
            calibrated_sensor_size: Some(record.sensor_size.into()),
        }
    }
}

impl AlignmentStrategy {
    /// Strategy for an optional stored calibration, falling back to [`AlignmentStrategy::CenterFit`].
    pub fn from_record(record: Option<&CalibrationRecord>) -> Self {
        match record {
            Some(record) => record.into(),
            None => AlignmentStrategy::CenterFit,
        }
    }

    /// Align `sensor` onto a canvas of `reference_size`.
    ///
    /// # Errors
    ///
    /// Returns [`CoregError::InvalidImage`] if either image is empty.
    pub fn align(
        &self,
        reference_size: ImageSize,
        sensor: &Image<u8, 3>,
    ) -> CoregResult<AlignmentResult> {
        if sensor.width() == 0 || sensor.height() == 0 {
            return Err(CoregError::InvalidImage(format!(
                "sensor image is empty ({})",
                sensor.size()
            )));
        }
        if reference_size.width == 0 || reference_size.height == 0 {
            return Err(CoregError::InvalidImage(format!(
                "reference image is empty ({reference_size})"
            )));
        }

        match self {
            AlignmentStrategy::Calibrated {
                transform,
                scale_factor,
                calibrated_sensor_size,
            } => {
                if let Some(expected) = calibrated_sensor_size {
                    if *expected != sensor.size() {
                        log::warn!(
                            "sensor image is {} but the calibration was captured on {}",
                            sensor.size(),
                            expected
                        );
                    }
                }
                let image = warp_calibrated(reference_size, sensor, transform, *scale_factor)?;
                Ok(AlignmentResult {
                    image,
                    fallback: false,
                })
            }
            AlignmentStrategy::CenterFit => Ok(AlignmentResult {
                image: center_fit(reference_size, sensor)?,
                fallback: true,
            }),
        }
    }
}

fn warp_calibrated(
    reference_size: ImageSize,
    sensor: &Image<u8, 3>,
    transform: &AffineTransform,
    scale_factor: f64,
) -> CoregResult<Image<u8, 3>> {
    let resized_size = normalized_size(sensor.size(), reference_size.height, scale_factor);
    if resized_size.width == 0 {
        return Err(CoregError::InvalidImage(format!(
            "sensor image {} collapses to zero width with scale {scale_factor}",
            sensor.size()
        )));
    }
    let resized = resize_to(sensor, resized_size)?;

    let mut aligned = Image::from_size_val(reference_size, 0u8)?;
    warp_affine(&resized, &mut aligned, &transform.as_array(), [0; 3])?;

    Ok(aligned)
}

/// Size of the sensor image once scaled to fit inside the reference, keeping its aspect ratio.
pub fn fit_size(sensor: ImageSize, reference: ImageSize) -> ImageSize {
    let scale = f64::min(
        reference.width as f64 / sensor.width as f64,
        reference.height as f64 / sensor.height as f64,
    );
    let fit = |len: usize, max: usize| ((len as f64 * scale).round() as usize).clamp(1, max);
    ImageSize {
        width: fit(sensor.width, reference.width),
        height: fit(sensor.height, reference.height),
    }
}

fn center_fit(reference_size: ImageSize, sensor: &Image<u8, 3>) -> CoregResult<Image<u8, 3>> {
    let fitted_size = fit_size(sensor.size(), reference_size);
    let fitted = resize_to(sensor, fitted_size)?;

    let padding = Padding2D::centered(fitted_size, reference_size)?;
    let mut canvas = Image::from_size_val(reference_size, 0u8)?;
    spatial_padding(&fitted, &mut canvas, padding, [0; 3])?;

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correspondence::CorrespondenceSet;

    fn uniform(width: usize, height: usize, val: u8) -> Image<u8, 3> {
        Image::from_size_val(ImageSize { width, height }, val).expect("valid size")
    }

    fn column_is(img: &Image<u8, 3>, x: usize, val: u8) -> bool {
        (0..img.height()).all(|y| img.pixel(x, y).is_ok_and(|px| px.iter().all(|&v| v == val)))
    }

    #[test]
    fn calibrated_resizes_then_warps() -> CoregResult<()> {
        let strategy = AlignmentStrategy::Calibrated {
            transform: AffineTransform {
                matrix: [[1.0, 0.0, 2.0], [0.0, 1.0, 0.0]],
            },
            scale_factor: 2.0,
            calibrated_sensor_size: None,
        };
        let reference_size = ImageSize {
            width: 8,
            height: 4,
        };

        let result = strategy.align(reference_size, &uniform(4, 2, 100))?;
        assert!(!result.fallback);
        assert_eq!(result.image.size(), reference_size);
        assert!(column_is(&result.image, 0, 0));
        assert!(column_is(&result.image, 1, 0));
        for x in 2..8 {
            assert!(column_is(&result.image, x, 100));
        }
        Ok(())
    }

    #[test]
    fn record_strategy_keeps_scale() {
        let record = CalibrationRecord::new(
            AffineTransform {
                matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            },
            2.25,
            ImageSize {
                width: 640,
                height: 480,
            },
            ImageSize {
                width: 1920,
                height: 1080,
            },
            CorrespondenceSet::default(),
        );
        let AlignmentStrategy::Calibrated { scale_factor, .. } =
            AlignmentStrategy::from_record(Some(&record))
        else {
            panic!("expected calibrated strategy");
        };
        assert_eq!(scale_factor, 2.25);
        assert_eq!(
            AlignmentStrategy::from_record(None),
            AlignmentStrategy::CenterFit
        );
    }

    #[test]
    fn center_fit_margins() -> CoregResult<()> {
        let reference_size = ImageSize {
            width: 1920,
            height: 1080,
        };
        let result = AlignmentStrategy::CenterFit.align(reference_size, &uniform(640, 480, 200))?;
        assert!(result.fallback);
        assert_eq!(result.image.size(), reference_size);

        assert!(column_is(&result.image, 0, 0));
        assert!(column_is(&result.image, 239, 0));
        assert!(column_is(&result.image, 240, 200));
        assert!(column_is(&result.image, 1679, 200));
        assert!(column_is(&result.image, 1680, 0));
        assert!(column_is(&result.image, 1919, 0));
        Ok(())
    }

    #[test]
    fn center_fit_odd_borders() -> CoregResult<()> {
        // tall sensor: height-limited, 3 spare columns
        let reference_size = ImageSize {
            width: 7,
            height: 4,
        };
        assert_eq!(
            fit_size(
                ImageSize {
                    width: 2,
                    height: 2
                },
                reference_size
            ),
            ImageSize {
                width: 4,
                height: 4
            }
        );
        let result = AlignmentStrategy::CenterFit.align(reference_size, &uniform(2, 2, 50))?;
        assert!(column_is(&result.image, 0, 0));
        assert!(column_is(&result.image, 1, 50));
        assert!(column_is(&result.image, 4, 50));
        assert!(column_is(&result.image, 5, 0));
        assert!(column_is(&result.image, 6, 0));
        Ok(())
    }

    #[test]
    fn empty_sensor_is_invalid() {
        let sensor = Image::<u8, 3>::new(
            ImageSize {
                width: 0,
                height: 0,
            },
            vec![],
        )
        .expect("empty image");
        assert!(matches!(
            AlignmentStrategy::CenterFit.align(
                ImageSize {
                    width: 4,
                    height: 4
                },
                &sensor
            ),
            Err(CoregError::InvalidImage(_))
        ));
    }
}
