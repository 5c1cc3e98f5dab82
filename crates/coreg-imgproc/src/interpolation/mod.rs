//! Bilinear pixel interpolation for the resampling kernels.
//!
//! Used by [`crate::resize`] and [`crate::warp`].

mod bilinear;

/// Grid generation and coordinate mapping utilities.
pub mod grid;

pub use bilinear::bilinear_interpolation;
