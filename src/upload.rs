use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageOutputFormat};
use thiserror::Error;

/// Matches the "Max size: 5MB" the upload form advertises.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image is empty")]
    Empty,

    #[error("Image is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Image data must be a base64 `data:image/...` URL")]
    InvalidDataUrl,

    #[error("Unsupported or corrupt image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to re-encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// A user photo, validated and re-encoded as JPEG for the model.
#[derive(Debug)]
pub struct ImageInput {
    jpeg: Vec<u8>,
    source_format: ImageFormat,
    width: u32,
    height: u32,
}

impl ImageInput {
    pub fn from_bytes(bytes: &[u8], max_bytes: usize) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }

        let source_format = image::guess_format(bytes).map_err(ImageError::Decode)?;
        let decoded = image::load_from_memory_with_format(bytes, source_format)
            .map_err(ImageError::Decode)?;

        let (width, height) = decoded.dimensions();

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

        let mut jpeg = Vec::new();
        rgb.write_to(
            &mut Cursor::new(&mut jpeg),
            ImageOutputFormat::Jpeg(JPEG_QUALITY),
        )
        .map_err(ImageError::Encode)?;

        Ok(Self {
            jpeg,
            source_format,
            width,
            height,
        })
    }

    /// Accepts what a browser `FileReader.readAsDataURL` produces.
    pub fn from_data_url(url: &str, max_bytes: usize) -> Result<Self, ImageError> {
        let (header, payload) = url
            .trim()
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or(ImageError::InvalidDataUrl)?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default();
        if !mime.starts_with("image/") || !params.any(|param| param == "base64") {
            return Err(ImageError::InvalidDataUrl);
        }

        // line-wrapped base64 is common
        let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

        // base64 inflates by 4/3
        let encoded_limit = max_bytes.saturating_mul(4) / 3 + 4;
        if payload.len() > encoded_limit {
            return Err(ImageError::TooLarge {
                size: payload.len() / 4 * 3,
                limit: max_bytes,
            });
        }

        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|_| ImageError::InvalidDataUrl)?;

        Self::from_bytes(&bytes, max_bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/jpeg;base64,{}",
            general_purpose::STANDARD.encode(&self.jpeg)
        )
    }

    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn source_format(&self) -> ImageFormat {
        self.source_format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
