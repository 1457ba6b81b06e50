/// Still-image buffers produced by the capture flow

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::CaptureError;
use crate::state::data::PLACEHOLDER_THUMBNAIL;

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// A captured still: either an encoded frame or the placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedImage {
    Frame {
        jpeg: Vec<u8>,
        width: u32,
        height: u32,
    },
    /// Used when no live stream was available
    Placeholder,
}

impl CapturedImage {
    /// Re-encode `frame` as JPEG at `quality` (1-100)
    pub fn encode(frame: &RgbImage, quality: u8) -> Result<Self, CaptureError> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).encode_image(frame)?;

        let (width, height) = frame.dimensions();
        tracing::debug!(width, height, bytes = jpeg.len(), quality, "frame encoded");

        Ok(CapturedImage::Frame {
            jpeg,
            width,
            height,
        })
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, CapturedImage::Placeholder)
    }

    /// Encoded JPEG bytes, if this is a real frame
    pub fn jpeg_bytes(&self) -> Option<&[u8]> {
        match self {
            CapturedImage::Frame { jpeg, .. } => Some(jpeg),
            CapturedImage::Placeholder => None,
        }
    }

    /// Value stored as the file record's thumbnail
    pub fn thumbnail(&self) -> String {
        match self {
            CapturedImage::Frame { jpeg, .. } => to_data_uri(jpeg),
            CapturedImage::Placeholder => PLACEHOLDER_THUMBNAIL.to_string(),
        }
    }
}

/// Wrap JPEG bytes in a `data:` URI
pub fn to_data_uri(jpeg: &[u8]) -> String {
    format!("{}{}", JPEG_DATA_URI_PREFIX, STANDARD.encode(jpeg))
}

/// Extract the JPEG bytes from a `data:` URI produced by `to_data_uri`
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let payload = uri.strip_prefix(JPEG_DATA_URI_PREFIX)?;
    STANDARD.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_encode_produces_jpeg() {
        let frame = RgbImage::from_pixel(32, 16, Rgb([200, 10, 10]));

        let image = CapturedImage::encode(&frame, 90).unwrap();

        let bytes = image.jpeg_bytes().unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert!(matches!(image, CapturedImage::Frame { width: 32, height: 16, .. }));
    }

    #[test]
    fn test_thumbnail_is_data_uri() {
        let frame = RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]));
        let image = CapturedImage::encode(&frame, 90).unwrap();

        let thumbnail = image.thumbnail();
        assert!(thumbnail.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode_data_uri(&thumbnail).as_deref(), image.jpeg_bytes());
    }

    #[test]
    fn test_placeholder_thumbnail() {
        assert_eq!(CapturedImage::Placeholder.thumbnail(), "/placeholder.svg");
        assert!(decode_data_uri("/placeholder.svg").is_none());
    }
}
