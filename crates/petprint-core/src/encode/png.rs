//! PNG encoding for export.
//!
//! Composited mockups and stripped designs are both exported losslessly so
//! the transparent edges produced by background removal survive the round
//! trip.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{to_data_url, Raster};

/// MIME type of every exported file.
pub const PNG_MIME_TYPE: &str = "image/png";

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// A file ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    /// Deterministic download name, e.g. `tshirt-design.png`.
    pub file_name: String,
    /// Always `image/png`.
    pub mime_type: String,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// The file as a `data:` URL, suitable for an anchor `href`.
    pub fn to_data_url(&self) -> String {
        to_data_url(&self.mime_type, &self.bytes)
    }
}

/// Encode RGBA pixel data to PNG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}

/// Encode a raster to PNG bytes.
pub fn encode_raster_png(raster: &Raster) -> Result<Vec<u8>, EncodeError> {
    encode_png(&raster.pixels, raster.width, raster.height)
}

/// Encode a raster as a downloadable PNG file with the given name.
pub fn export_png(raster: &Raster, file_name: &str) -> Result<ExportedFile, EncodeError> {
    Ok(ExportedFile {
        file_name: file_name.to_string(),
        mime_type: PNG_MIME_TYPE.to_string(),
        bytes: encode_raster_png(raster)?,
    })
}
