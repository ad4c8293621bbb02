//! Label photo normalisation.
//!
//! Uploaded photos are decoded, turned upright according to their EXIF
//! orientation, bounded so the longest edge is at most
//! [`MAX_EDGE`] pixels (aspect ratio preserved) and re-encoded as JPEG at
//! [`JPEG_QUALITY`]. The result is small enough to embed as a data URL
//! thumbnail and to send inline to the vision service.

use base64::engine::general_purpose::STANDARD as BASE64;
use std::io::Cursor;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};

/// Longest edge of a normalised image, in pixels.
pub const MAX_EDGE: u32 = 1200;

/// JPEG quality used for re-encoding (0.85 on a 0–1 scale).
pub const JPEG_QUALITY: u8 = 85;

/// MIME type of every normalised image.
pub const MIME_JPEG: &str = "image/jpeg";

/// Errors from decoding or re-encoding an uploaded image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("No image data received")]
    Empty,

    #[error("Could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Could not encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// A decoded, bounded, JPEG re-encoded image.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl NormalizedImage {
    /// Standard base64 of the JPEG bytes (no data URL prefix).
    pub fn base64(&self) -> String {
        BASE64.encode(&self.jpeg)
    }

    /// `data:image/jpeg;base64,...` URL suitable for a stored thumbnail.
    pub fn data_url(&self) -> String {
        format!("data:{MIME_JPEG};base64,{}", self.base64())
    }
}

/// Compute output dimensions so the longest edge is at most `max_edge`.
///
/// Landscape images are bounded by width, everything else (including square
/// images) by height. Scaled sides are rounded and never drop below 1.
pub fn bounded_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width > height {
        if width > max_edge {
            return (max_edge, scale_side(height, max_edge, width));
        }
    } else if height > max_edge {
        return (scale_side(width, max_edge, height), max_edge);
    }
    (width, height)
}

fn scale_side(side: u32, target: u32, longest: u32) -> u32 {
    let scaled = f64::from(side) * f64::from(target) / f64::from(longest);
    (scaled.round() as u32).max(1)
}

/// Decode `bytes` and apply the EXIF orientation tag, if any.
fn decode_upright(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.into()))?
        .into_decoder()
        .map_err(ImageError::Decode)?;
    let orientation = decoder.orientation().map_err(ImageError::Decode)?;

    let mut decoded = DynamicImage::from_decoder(decoder).map_err(ImageError::Decode)?;
    decoded.apply_orientation(orientation);
    Ok(decoded)
}

/// Decode `bytes`, bound them to [`MAX_EDGE`] and re-encode as JPEG.
///
/// Fails if the bytes are empty or are not a supported image format.
pub fn normalize_image(bytes: &[u8]) -> Result<NormalizedImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    let decoded = decode_upright(bytes)?;
    let (width, height) = bounded_dimensions(decoded.width(), decoded.height(), MAX_EDGE);

    let bounded = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel.
    let rgb = bounded.to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(ImageError::Encode)?;

    Ok(NormalizedImage {
        width,
        height,
        jpeg,
    })
}
