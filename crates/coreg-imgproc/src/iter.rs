use coreg_image::Image;

/// Apply a function to each destination pixel for grid sampling.
///
/// `map_x` and `map_y` hold, for every destination pixel, the source
/// coordinates to sample from. Rows are visited in order on the calling
/// thread.
pub fn iter_rows_resample<T, const C: usize>(
    dst: &mut Image<T, C>,
    map_x: &[f32],
    map_y: &[f32],
    mut f: impl FnMut(f32, f32, &mut [T]),
) {
    let cols = dst.cols();
    if cols == 0 {
        return;
    }

    dst.as_slice_mut()
        .chunks_exact_mut(C * cols)
        .zip(map_x.chunks_exact(cols))
        .zip(map_y.chunks_exact(cols))
        .for_each(|((dst_chunk, map_x_chunk), map_y_chunk)| {
            dst_chunk
                .chunks_exact_mut(C)
                .zip(map_x_chunk.iter().zip(map_y_chunk.iter()))
                .for_each(|(dst_pixel, (&x, &y))| {
                    f(x, y, dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use coreg_image::{Image, ImageError, ImageSize};

    #[test]
    fn iter_rows_resample_visits_every_pixel() -> Result<(), ImageError> {
        let mut dst = Image::<f32, 2>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0.0,
        )?;
        let map_x = vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let map_y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        super::iter_rows_resample(&mut dst, &map_x, &map_y, |x, y, px| {
            px[0] = x;
            px[1] = y;
        });

        assert_eq!(
            dst.as_slice(),
            &[0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0]
        );
        Ok(())
    }
}
