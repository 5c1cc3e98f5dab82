use coreg_image::{Image, ImageDtype, ImageError};

use crate::interpolation::{bilinear_interpolation, grid::meshgrid_from_fn};
use crate::iter;

/// Inverts a 2x3 affine transformation matrix.
///
/// Arguments:
///
/// * `m` - The 2x3 affine transformation matrix in row-major order.
///
/// Returns:
///
/// The inverted 2x3 affine transformation matrix. A singular matrix yields
/// an all-zero linear part, as OpenCV does.
pub fn invert_affine_transform(m: &[f32; 6]) -> [f32; 6] {
    let (a, b, c, d, e, f) = (m[0], m[1], m[2], m[3], m[4], m[5]);

    // follow OpenCV: check for determinant == 0
    // https://github.com/opencv/opencv/blob/4.9.0/modules/imgproc/src/imgwarp.cpp#L2765
    let determinant = a * e - b * d;
    let inv_determinant = if determinant != 0.0 {
        1.0 / determinant
    } else {
        0.0
    };

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    [new_a, new_b, new_c, new_d, new_e, new_f]
}

/// Applies an affine transformation to a point.
pub fn transform_point(x: f32, y: f32, m: &[f32; 6]) -> (f32, f32) {
    let u = m[0] * x + m[1] * y + m[2];
    let v = m[3] * x + m[4] * y + m[5];
    (u, v)
}

/// Applies an affine transformation to an image.
///
/// Every destination pixel is mapped back into `src` through the inverse of
/// `m`. Pixels that land inside `src` are sampled bilinearly; the
/// rest are set to `border_value`.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image; its size defines the output canvas.
/// * `m` - The 2x3 affine transformation matrix mapping `src` to `dst` coordinates.
/// * `border_value` - The value written where the source has no data.
///
/// # Example
///
/// ```
/// use coreg_image::{Image, ImageSize};
/// use coreg_imgproc::warp::warp_affine;
///
/// let src = Image::<_, 3>::from_size_val(
///    ImageSize {
///       width: 4,
///       height: 5,
///    },
///    1f32,
/// ).unwrap();
///
/// let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
///
/// let mut dst = Image::<_, 3>::from_size_val(src.size(), 0.0).unwrap();
///
/// warp_affine(&src, &mut dst, &m, [0.0; 3]).unwrap();
///
/// assert_eq!(dst.size().width, 4);
/// assert_eq!(dst.size().height, 5);
/// ```
pub fn warp_affine<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    m: &[f32; 6],
    border_value: [T; C],
) -> Result<(), ImageError>
where
    T: ImageDtype,
{
    if src.width() == 0 || src.height() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    // invert affine transform matrix to find corresponding positions in src from dst
    let m_inv = invert_affine_transform(m);

    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());
    let (map_x, map_y) = meshgrid_from_fn(dst_cols, dst_rows, |x, y| {
        transform_point(x as f32, y as f32, &m_inv)
    });

    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);

    iter::iter_rows_resample(dst, &map_x, &map_y, |x, y, dst_pixel| {
        if x >= 0.0 && x < src_cols && y >= 0.0 && y < src_rows {
            dst_pixel.iter_mut().enumerate().for_each(|(k, pixel)| {
                *pixel = T::from_f32(bilinear_interpolation(src, x, y, k))
            });
        } else {
            dst_pixel.copy_from_slice(&border_value);
        }
    });

    Ok(())
}
