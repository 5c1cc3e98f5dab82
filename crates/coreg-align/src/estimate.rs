//! Closed-form affine estimation from three point correspondences.

use serde::{Deserialize, Serialize};

use crate::correspondence::Correspondence;
use crate::error::{CoregError, CoregResult};

/// Number of correspondences an affine transform is solved from.
pub const AFFINE_POINTS: usize = 3;

/// Relative tolerance on the correspondence determinant below which the
/// source points are considered collinear.
const DEGENERACY_EPS: f64 = 1e-9;

/// A 2x3 affine transform mapping source pixels to target pixels.
///
/// `target = matrix * [x, y, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    /// Row-major 2x3 matrix.
    pub matrix: [[f64; 3]; 2],
}

impl AffineTransform {
    /// Map a source point into the target frame.
    pub fn apply(&self, point: [f64; 2]) -> [f64; 2] {
        let [r0, r1] = self.matrix;
        [
            r0[0] * point[0] + r0[1] * point[1] + r0[2],
            r1[0] * point[0] + r1[1] * point[1] + r1[2],
        ]
    }

    /// The matrix flattened to the `[f32; 6]` layout used by the warp kernels.
    pub fn as_array(&self) -> [f32; 6] {
        let [r0, r1] = self.matrix;
        [
            r0[0] as f32,
            r0[1] as f32,
            r0[2] as f32,
            r1[0] as f32,
            r1[1] as f32,
            r1[2] as f32,
        ]
    }
}

fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Solve the affine transform that maps `src[i]` exactly onto `dst[i]`.
///
/// # Errors
///
/// Returns [`CoregError::DegenerateCorrespondence`] when the source points are collinear.
///
/// # Example
///
/// ```
/// use coreg_align::estimate::get_affine_transform;
///
/// let m = get_affine_transform(
///     &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
///     &[[5.0, 7.0], [7.0, 7.0], [5.0, 10.0]],
/// ).unwrap();
/// assert_eq!(m.matrix, [[2.0, 0.0, 5.0], [0.0, 3.0, 7.0]]);
/// ```
pub fn get_affine_transform(
    src: &[[f64; 2]; 3],
    dst: &[[f64; 2]; 3],
) -> CoregResult<AffineTransform> {
    let a = [
        [src[0][0], src[0][1], 1.0],
        [src[1][0], src[1][1], 1.0],
        [src[2][0], src[2][1], 1.0],
    ];
    let det = det3(a);

    // scale the tolerance with the spread of the points so pixel units do not matter
    let extent = src
        .iter()
        .flat_map(|p| src.iter().map(move |q| (p[0] - q[0]).abs().max((p[1] - q[1]).abs())))
        .fold(0.0f64, f64::max);

    if extent == 0.0 || det.abs() <= DEGENERACY_EPS * extent * extent {
        return Err(CoregError::DegenerateCorrespondence(*src));
    }

    // Cramer's rule, one output coordinate at a time
    let mut matrix = [[0.0; 3]; 2];
    for (row, out) in matrix.iter_mut().enumerate() {
        let rhs = [dst[0][row], dst[1][row], dst[2][row]];
        for (col, coeff) in out.iter_mut().enumerate() {
            let mut m = a;
            for i in 0..3 {
                m[i][col] = rhs[i];
            }
            *coeff = det3(m) / det;
        }
    }

    Ok(AffineTransform { matrix })
}

/// Estimate the affine transform from a list of correspondences.
///
/// Only the first three correspondences participate; the transform
/// interpolates them exactly and ignores any further points.
///
/// # Errors
///
/// * [`CoregError::InsufficientPoints`] with fewer than three correspondences.
/// * [`CoregError::DegenerateCorrespondence`] when the first three source points are collinear.
pub fn estimate_affine(correspondences: &[Correspondence]) -> CoregResult<AffineTransform> {
    if correspondences.len() < AFFINE_POINTS {
        return Err(CoregError::InsufficientPoints {
            required: AFFINE_POINTS,
            reference: correspondences.len(),
            sensor: correspondences.len(),
        });
    }

    if correspondences.len() > AFFINE_POINTS {
        log::debug!(
            "using the first {} of {} correspondences",
            AFFINE_POINTS,
            correspondences.len()
        );
    }

    let src = [
        correspondences[0].source.to_f64(),
        correspondences[1].source.to_f64(),
        correspondences[2].source.to_f64(),
    ];
    let dst = [
        correspondences[0].target.to_f64(),
        correspondences[1].target.to_f64(),
        correspondences[2].target.to_f64(),
    ];

    get_affine_transform(&src, &dst)
}
