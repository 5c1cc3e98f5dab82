/// Create a meshgrid of source coordinates from a mapping function.
///
/// # Arguments
///
/// * `cols` - The number of columns indicating the width of the grid
/// * `rows` - The number of rows indicating the height of the grid
/// * `f` - Maps a destination pixel `(x, y)` to the source coordinates to sample.
///
/// # Returns
///
/// A tuple of row-major buffers of length `rows * cols` with the x and y source coordinates.
pub fn meshgrid_from_fn(
    cols: usize,
    rows: usize,
    f: impl Fn(usize, usize) -> (f32, f32),
) -> (Vec<f32>, Vec<f32>) {
    let mut map_x = Vec::with_capacity(rows * cols);
    let mut map_y = Vec::with_capacity(rows * cols);

    for y in 0..rows {
        for x in 0..cols {
            let (u, v) = f(x, y);
            map_x.push(u);
            map_y.push(v);
        }
    }

    (map_x, map_y)
}

/// Evenly spaced samples over `[start, end]`, like `numpy.linspace`.
pub(crate) fn linspace(start: f32, end: f32, num: usize) -> Vec<f32> {
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f32;
            (0..num).map(|i| start + step * i as f32).collect()
        }
    }
}
