//! Geometric image transformations.
//!
//! - Affine warps with a constant border ([`warp_affine`])
//! - Affine transform inversion ([`invert_affine_transform`])
//!
//! # Examples
//!
//! Shifting an image 10 pixels to the right:
//!
//! ```no_run
//! let shift = [1.0f32, 0.0, 10.0, 0.0, 1.0, 0.0];
//! let inverse = coreg_imgproc::warp::invert_affine_transform(&shift);
//! assert_eq!(inverse[2], -10.0);
//! ```

mod affine;

pub use affine::{invert_affine_transform, transform_point, warp_affine};
