use coreg_image::{Image, ImageError, ImageSize};

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// Padding that centers an image of size `inner` inside a canvas of size `outer`.
    ///
    /// Odd leftovers go to the right and bottom sides, so opposite sides never
    /// differ by more than one pixel.
    ///
    /// # Errors
    ///
    /// Returns an error if `inner` does not fit inside `outer`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coreg_image::ImageSize;
    /// use coreg_imgproc::padding::Padding2D;
    ///
    /// let padding = Padding2D::centered(
    ///     ImageSize { width: 1440, height: 1080 },
    ///     ImageSize { width: 1920, height: 1080 },
    /// ).unwrap();
    ///
    /// assert_eq!((padding.left, padding.right), (240, 240));
    /// assert_eq!((padding.top, padding.bottom), (0, 0));
    /// ```
    pub fn centered(inner: ImageSize, outer: ImageSize) -> Result<Self, ImageError> {
        if inner.width > outer.width || inner.height > outer.height {
            return Err(ImageError::InvalidImageSize(
                inner.width,
                inner.height,
                outer.width,
                outer.height,
            ));
        }

        let dx = outer.width - inner.width;
        let dy = outer.height - inner.height;

        Ok(Self {
            top: dy / 2,
            bottom: dy - dy / 2,
            left: dx / 2,
            right: dx - dx / 2,
        })
    }

    /// Validates that `new_size` equals `old_size` grown by this padding.
    pub fn validate_size(&self, old_size: ImageSize, new_size: ImageSize) -> bool {
        new_size.width == old_size.width + self.left + self.right
            && new_size.height == old_size.height + self.top + self.bottom
    }
}

/// Writes `src` into `dst` surrounded by the given padding.
///
/// # Arguments
///
/// * `src` - The source image to pad.
/// * `dst` - The destination image where the padded output will be stored.
/// * `padding` - The amount of padding (in pixels) for all four sides.
/// * `constant_value` - The pixel value of the border, one value per channel.
///
/// # Errors
///
/// Returns an error if the size of `dst` does not match `src` grown by `padding`.
///
/// # Example
///
/// ```rust
/// use coreg_image::{ImageSize, Image};
/// use coreg_imgproc::padding::{Padding2D, spatial_padding};
///
/// let src = Image::<u8, 3>::new(
///     ImageSize { width: 2, height: 2 },
///     vec![1u8; 2 * 2 * 3],
/// ).unwrap();
///
/// let mut dst = Image::<u8, 3>::from_size_val(
///     ImageSize { width: 4, height: 4 },
///     0u8,
/// ).unwrap();
///
/// spatial_padding(
///     &src,
///     &mut dst,
///     Padding2D { top: 1, bottom: 1, left: 1, right: 1 },
///     [0u8; 3],
/// ).unwrap();
///
/// assert_eq!(dst.get_pixel(1, 1, 0).unwrap(), &1);
/// assert_eq!(dst.get_pixel(0, 0, 0).unwrap(), &0);
/// ```
pub fn spatial_padding<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    padding: Padding2D,
    constant_value: [T; C],
) -> Result<(), ImageError>
where
    T: Copy,
{
    if !padding.validate_size(src.size(), dst.size()) {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            src.width() + padding.left + padding.right,
            src.height() + padding.top + padding.bottom,
        ));
    }

    let old_size = src.size();
    let new_size = dst.size();

    let old_data = src.as_slice();
    let new_data = dst.as_slice_mut();

    new_data
        .chunks_exact_mut(C)
        .for_each(|chunk| chunk.copy_from_slice(&constant_value));

    // copy old image data as center of new image data
    let new_stride = new_size.width * C;
    let old_stride = old_size.width * C;

    if old_stride > 0 {
        let row_offset = padding.top * new_stride + padding.left * C;

        for (src_row, dst_row) in old_data
            .chunks_exact(old_stride)
            .zip(new_data[row_offset..].chunks_mut(new_stride))
        {
            dst_row[..old_stride].copy_from_slice(src_row);
        }
    }

    Ok(())
}
