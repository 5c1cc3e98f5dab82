//! Resolution normalization between the reference and sensor pixel grids.
//!
//! Before any point is clicked the sensor image is scaled so that its height
//! matches the reference height. The resulting scale factor is recorded with
//! the calibration and reused verbatim whenever the calibration is applied.

use coreg_image::ImageSize;

use crate::error::{CoregError, CoregResult};

/// Scale factor mapping the sensor grid onto the reference grid: `H_reference / H_sensor`.
///
/// # Errors
///
/// Returns [`CoregError::InvalidImage`] if either height is zero.
///
/// # Example
///
/// ```
/// let scale = coreg_align::normalize::scale_factor(1080, 480).unwrap();
/// assert_eq!(scale, 2.25);
/// ```
pub fn scale_factor(reference_height: usize, sensor_height: usize) -> CoregResult<f64> {
    if sensor_height == 0 {
        return Err(CoregError::InvalidImage(
            "sensor image has zero height".to_string(),
        ));
    }
    if reference_height == 0 {
        return Err(CoregError::InvalidImage(
            "reference image has zero height".to_string(),
        ));
    }
    Ok(reference_height as f64 / sensor_height as f64)
}

/// Width of the sensor image once scaled: `round(W_sensor * scale)`.
pub fn resized_width(sensor_width: usize, scale: f64) -> usize {
    (sensor_width as f64 * scale).round() as usize
}

/// Size the sensor image is resized to before clicking or warping.
///
/// The height is pinned to the reference height and the width follows the
/// recorded scale factor.
pub fn normalized_size(sensor: ImageSize, reference_height: usize, scale: f64) -> ImageSize {
    ImageSize {
        width: resized_width(sensor.width, scale),
        height: reference_height,
    }
}
