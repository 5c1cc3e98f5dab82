use coreg_image::{Image, ImageDtype};

/// Kernel for bilinear interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `c` - The channel of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel value.
pub fn bilinear_interpolation<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
    c: usize,
) -> f32 {
    let (rows, cols) = (image.rows(), image.cols());

    let iu = u.trunc() as usize;
    let iv = v.trunc() as usize;

    let iu0 = iu.min(cols - 1);
    let iv0 = iv.min(rows - 1);

    let frac_u = u.fract();
    let frac_v = v.fract();

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let iu1 = if iu0 + 1 < cols { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < rows { iv0 + 1 } else { iv0 };

    let data = image.as_slice();
    let at = |y: usize, x: usize| -> f32 { data[(y * cols + x) * C + c].into() };

    at(iv0, iu0) * frac_uu * frac_vv
        + at(iv0, iu1) * frac_u * frac_vv
        + at(iv1, iu0) * frac_uu * frac_v
        + at(iv1, iu1) * frac_u * frac_v
}

#[cfg(test)]
mod tests {
    use super::bilinear_interpolation;
    use coreg_image::{Image, ImageError, ImageSize};

    #[test]
    fn bilinear_midpoint() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0, 100, 100, 200],
        )?;
        approx::assert_relative_eq!(bilinear_interpolation(&image, 0.5, 0.5, 0), 100.0);
        approx::assert_relative_eq!(bilinear_interpolation(&image, 1.0, 1.0, 0), 200.0);
        Ok(())
    }
}
