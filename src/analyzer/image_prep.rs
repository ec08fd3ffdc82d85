//! Photo loading, resizing, and base64 encoding for vision APIs.
//!
//! Facial photos straight off a phone camera are far larger than the
//! providers need, so every image is capped at 1024px on its longest edge.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::info;

use crate::error::AnalysisError;

/// Maximum dimension (width or height) for images sent to vision APIs.
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

/// Below this on the shortest side, skin texture is not resolvable.
pub const MIN_IMAGE_DIMENSION: u32 = 200;

pub const MEDIA_TYPE: &str = "image/jpeg";

/// A photo ready to embed in a provider request.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Base64-encoded JPEG
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

impl PreparedImage {
    pub fn media_type(&self) -> &'static str {
        MEDIA_TYPE
    }

    /// `data:` URL form used by OpenAI-style image content parts.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", MEDIA_TYPE, self.base64)
    }
}

/// Decode, validate, downscale and re-encode a photo.
///
/// # Errors
/// - The bytes are not a decodable JPEG/PNG/WebP image
/// - The shortest side is below `MIN_IMAGE_DIMENSION`
pub fn prepare_image(image_bytes: &[u8]) -> Result<PreparedImage, AnalysisError> {
    let img = image::load_from_memory(image_bytes).map_err(|e| {
        AnalysisError::Image(format!(
            "Failed to load photo: {}. Ensure it's a valid JPEG/PNG/WebP.",
            e
        ))
    })?;

    let (width, height) = (img.width(), img.height());
    info!("Loaded photo: {}x{}", width, height);

    if width.min(height) < MIN_IMAGE_DIMENSION {
        return Err(AnalysisError::Image(format!(
            "Photo too small for reliable analysis: {}x{}. Minimum dimension is {}px.",
            width, height, MIN_IMAGE_DIMENSION
        )));
    }

    let resized = resize_if_needed(img, MAX_IMAGE_DIMENSION);
    let jpeg_bytes = encode_to_jpeg(&resized)?;
    info!(
        "Prepared photo: {}x{}, {} bytes JPEG",
        resized.width(),
        resized.height(),
        jpeg_bytes.len()
    );

    Ok(PreparedImage {
        base64: STANDARD.encode(&jpeg_bytes),
        width: resized.width(),
        height: resized.height(),
    })
}

fn resize_if_needed(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if width <= max_dimension && height <= max_dimension {
        return img;
    }

    let scale = max_dimension as f32 / width.max(height) as f32;
    let new_width = (width as f32 * scale) as u32;
    let new_height = (height as f32 * scale) as u32;

    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

fn encode_to_jpeg(img: &DynamicImage) -> Result<Vec<u8>, AnalysisError> {
    // JPEG has no alpha channel; camera PNGs often do.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    rgb.write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| AnalysisError::Image(format!("Failed to encode photo to JPEG: {}", e)))?;
    Ok(buffer.into_inner())
}
