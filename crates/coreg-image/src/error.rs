/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images are expected to share a size.
    #[error("Invalid image size: ({0}x{1}) does not fit ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel index is out of bounds.
    #[error("Pixel index out of bounds. The index is ({0}, {1}) but the image size is ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index out of bounds. The index is {0} but the number of channels is {1}")]
    ChannelIndexOutOfBounds(usize, usize),
}
