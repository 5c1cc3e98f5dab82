use crate::interpolation::{
    bilinear_interpolation,
    grid::{linspace, meshgrid_from_fn},
};
use crate::iter;
use coreg_image::{Image, ImageDtype, ImageError};

/// Resize an image to the size of the destination image.
///
/// The corner pixels of `src` map onto the corner pixels of `dst` and the
/// pixels in between are sampled bilinearly.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, already allocated with the new size.
///
/// # Errors
///
/// Returns an error if either image is empty.
///
/// # Example
///
/// ```
/// use coreg_image::{Image, ImageSize};
/// use coreg_imgproc::resize::resize_native;
///
/// let image = Image::<_, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0u8; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let mut image_resized = Image::<_, 3>::from_size_val(
///     ImageSize {
///         width: 2,
///         height: 3,
///     },
///     0u8,
/// )
/// .unwrap();
///
/// resize_native(&image, &mut image_resized).unwrap();
///
/// assert_eq!(image_resized.size().width, 2);
/// assert_eq!(image_resized.size().height, 3);
/// ```
pub fn resize_native<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: ImageDtype,
{
    if src.width() == 0 || src.height() == 0 || dst.width() == 0 || dst.height() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let xs = linspace(0.0, (src.width() - 1) as f32, dst.width());
    let ys = linspace(0.0, (src.height() - 1) as f32, dst.height());

    let (map_x, map_y) = meshgrid_from_fn(dst.cols(), dst.rows(), |x, y| (xs[x], ys[y]));

    iter::iter_rows_resample(dst, &map_x, &map_y, |u, v, dst_pixel| {
        dst_pixel.iter_mut().enumerate().for_each(|(k, pixel)| {
            *pixel = T::from_f32(bilinear_interpolation(src, u, v, k));
        });
    });

    Ok(())
}

/// Resize an image into a newly allocated image of the given size.
///
/// Convenience wrapper around [`resize_native`].
pub fn resize_to<T, const C: usize>(
    src: &Image<T, C>,
    new_size: coreg_image::ImageSize,
) -> Result<Image<T, C>, ImageError>
where
    T: ImageDtype,
{
    let mut dst = Image::from_size_val(new_size, T::default())?;
    resize_native(src, &mut dst)?;
    Ok(dst)
}
