use std::path::Path;

use coreg_image::{Image, ImageSize};

use crate::{error::IoError, jpeg::write_image_jpeg_rgb8, png::write_image_png_rgb8};

/// Output encodings chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `.jpg` / `.jpeg`
    Jpeg,
    /// `.png`
    Png,
}

impl ImageFormat {
    /// Resolve the format from the extension of `file_path`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidFileExtension`] when the extension is missing or unknown.
    pub fn from_path(file_path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file_path = file_path.as_ref();
        let ext = file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
            Some("png") => Ok(ImageFormat::Png),
            _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
        }
    }
}

/// Reads an RGB image from the given file path.
///
/// The format is detected from the file content, so any format supported by
/// the `image` crate is accepted. Grayscale and alpha images are converted to
/// three channels.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the decoded rgb8 data.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an RGB image, choosing the encoder from the file extension.
///
/// # Arguments
///
/// * `file_path` - The destination path; its extension selects the encoder.
/// * `image` - The image to write.
/// * `jpeg_quality` - The quality used when the destination is a JPEG file.
pub fn write_image_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
    jpeg_quality: u8,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    match ImageFormat::from_path(file_path)? {
        ImageFormat::Jpeg => write_image_jpeg_rgb8(file_path, image, jpeg_quality),
        ImageFormat::Png => write_image_png_rgb8(file_path, image),
    }
}
