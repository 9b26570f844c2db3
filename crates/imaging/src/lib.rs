use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Content type of every transform result.
pub const OUTPUT_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("could not decode image: {source}")]
    Decode {
        #[source]
        source: image::ImageError,
    },
    #[error("could not encode grayscale image: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },
}

/// Decode image bytes in any supported format, convert to 8-bit grayscale,
/// and encode the result as PNG.
pub fn grayscale_png(bytes: &[u8]) -> Result<Vec<u8>, ImagingError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|source| ImagingError::Decode { source })?;
    let gray = DynamicImage::ImageLuma8(decoded.to_luma8());

    let mut out = Cursor::new(Vec::new());
    gray.write_to(&mut out, ImageFormat::Png)
        .map_err(|source| ImagingError::Encode { source })?;
    Ok(out.into_inner())
}
