#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use coreg_image as image;

#[doc(inline)]
pub use coreg_imgproc as imgproc;

#[doc(inline)]
pub use coreg_io as io;

#[doc(inline)]
pub use coreg_align as align;
