#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// utilities to draw markers and labels on images.
pub mod draw;

/// utilities for interpolation.
pub mod interpolation;

/// row iteration utilities shared by the resampling kernels.
pub mod iter;

/// spatial padding of images onto a larger canvas.
pub mod padding;

/// utility functions for resizing images.
pub mod resize;

/// image geometric transformations module.
pub mod warp;
