//! Trimming of transparent borders.
//!
//! After background removal the subject usually occupies a small part of
//! the canvas. This module finds the tightest rectangle containing every
//! visible pixel and cuts the raster down to it, so the overlay handles on
//! the mockup hug the actual artwork.
//!
//! # Algorithm
//!
//! A single row-major pass over the alpha channel tracks the running
//! min/max X and Y of pixels whose alpha exceeds the threshold. Each pixel
//! is read exactly once. The sub-rectangle is then copied row by row.
//!
//! # Failure Semantics
//!
//! [`crop_encoded`] never loses the caller's image: if decoding or
//! re-encoding fails, the original bytes come back together with the
//! failure in [`ProcessedDesign::crop_failure`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::decode::{decode_raster_no_orientation, to_data_url, DecodeError, Raster};
use crate::encode::{encode_raster_png, EncodeError, PNG_MIME_TYPE};

/// Inclusive pixel bounds of the visible content, plus the size of the
/// raster they were measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl CropBox {
    /// Width of the box in pixels (always at least 1).
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    /// Height of the box in pixels (always at least 1).
    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    /// True when the box covers the whole original raster.
    pub fn is_full(&self) -> bool {
        self.left == 0
            && self.top == 0
            && self.width() == self.original_width
            && self.height() == self.original_height
    }
}

/// Result of cropping a decoded raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropResult {
    /// The cropped raster, or the input unchanged when `crop_box` is `None`.
    pub raster: Raster,
    /// Bounds of the visible content; `None` for a fully transparent input.
    pub crop_box: Option<CropBox>,
}

/// Why trimming an encoded design failed.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("Could not decode design for cropping: {0}")]
    Decode(#[from] DecodeError),

    #[error("Could not encode cropped design: {0}")]
    Encode(#[from] EncodeError),
}

/// An encoded (PNG) design after transparent-border trimming.
#[derive(Debug)]
pub struct ProcessedDesign {
    /// Encoded image bytes: the cropped PNG, or the untouched input.
    pub png: Vec<u8>,
    /// Width of `png` in pixels, when known.
    pub width: Option<u32>,
    /// Height of `png` in pixels, when known.
    pub height: Option<u32>,
    /// Bounds of the visible content in the uncropped image.
    pub crop_box: Option<CropBox>,
    /// Set when trimming failed and `png` is the uncropped input.
    pub crop_failure: Option<CropError>,
}

impl ProcessedDesign {
    /// The design as a PNG `data:` URL.
    pub fn to_data_url(&self) -> String {
        to_data_url(PNG_MIME_TYPE, &self.png)
    }
}

/// Find the bounds of all pixels with alpha strictly above `alpha_threshold`.
///
/// Returns `None` when no pixel qualifies (or the raster is empty).
pub fn find_alpha_bounds(raster: &Raster, alpha_threshold: u8) -> Option<CropBox> {
    if raster.is_empty() {
        return None;
    }

    let row_len = raster.width as usize * 4;
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    let rows = raster.pixels.chunks_exact(row_len).take(raster.height as usize);
    for (y, row) in rows.enumerate() {
        for (x, px) in row.chunks_exact(4).enumerate() {
            if px[3] > alpha_threshold {
                let (x, y) = (x as u32, y as u32);
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
                found = true;
            }
        }
    }

    found.then_some(CropBox {
        left: min_x,
        top: min_y,
        right: max_x,
        bottom: max_y,
        original_width: raster.width,
        original_height: raster.height,
    })
}

/// Copy the region described by `crop_box` into a new raster.
pub fn crop_to_box(raster: &Raster, crop_box: &CropBox) -> Raster {
    let out_width = crop_box.width();
    let out_height = crop_box.height();
    let src_row_len = raster.width as usize * 4;
    let dst_row_len = out_width as usize * 4;
    let mut output = Vec::with_capacity(dst_row_len * out_height as usize);

    for y in crop_box.top..=crop_box.bottom {
        let start = y as usize * src_row_len + crop_box.left as usize * 4;
        output.extend_from_slice(&raster.pixels[start..start + dst_row_len]);
    }

    Raster::new(out_width, out_height, output)
}

/// Trim transparent borders from a decoded raster.
///
/// The raster is consumed; when nothing qualifies it is handed back as-is
/// with `crop_box = None`.
pub fn crop_transparent_borders(raster: Raster, alpha_threshold: u8) -> CropResult {
    match find_alpha_bounds(&raster, alpha_threshold) {
        Some(crop_box) => {
            debug!(
                left = crop_box.left,
                top = crop_box.top,
                width = crop_box.width(),
                height = crop_box.height(),
                "trimmed transparent borders"
            );
            CropResult {
                raster: crop_to_box(&raster, &crop_box),
                crop_box: Some(crop_box),
            }
        }
        None => CropResult {
            raster,
            crop_box: None,
        },
    }
}

/// Trim transparent borders from an encoded image and re-encode as PNG.
///
/// # Behavior
///
/// - Fully transparent input: original bytes, original size, no box
/// - Decode or encode failure: original bytes, unknown size, and the error
///   in `crop_failure`
pub fn crop_encoded(bytes: Vec<u8>, alpha_threshold: u8) -> ProcessedDesign {
    let raster = match decode_raster_no_orientation(&bytes) {
        Ok(raster) => raster,
        Err(e) => return fallback(bytes, e.into()),
    };
    let (width, height) = (raster.width, raster.height);

    let cropped = crop_transparent_borders(raster, alpha_threshold);
    let Some(crop_box) = cropped.crop_box else {
        return ProcessedDesign {
            png: bytes,
            width: Some(width),
            height: Some(height),
            crop_box: None,
            crop_failure: None,
        };
    };

    match encode_raster_png(&cropped.raster) {
        Ok(png) => ProcessedDesign {
            png,
            width: Some(cropped.raster.width),
            height: Some(cropped.raster.height),
            crop_box: Some(crop_box),
            crop_failure: None,
        },
        Err(e) => fallback(bytes, e.into()),
    }
}

fn fallback(bytes: Vec<u8>, error: CropError) -> ProcessedDesign {
    warn!(%error, "transparent border trimming failed, keeping uncropped design");
    ProcessedDesign {
        png: bytes,
        width: None,
        height: None,
        crop_box: None,
        crop_failure: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_png;

    /// Transparent raster with an opaque rectangle at the given inclusive bounds.
    fn raster_with_block(width: u32, height: u32, left: u32, top: u32, right: u32, bottom: u32) -> Raster {
        let mut raster = Raster::filled(width, height, [0, 0, 0, 0]);
        for y in top..=bottom {
            for x in left..=right {
                let idx = ((y * width + x) * 4) as usize;
                raster.pixels[idx..idx + 4].copy_from_slice(&[x as u8, y as u8, 7, 255]);
            }
        }
        raster
    }

    #[test]
    fn test_bounds_of_block() {
        let raster = raster_with_block(10, 8, 2, 3, 6, 5);
        let b = find_alpha_bounds(&raster, 8).unwrap();

        assert_eq!((b.left, b.top, b.right, b.bottom), (2, 3, 6, 5));
        assert_eq!((b.original_width, b.original_height), (10, 8));
        assert_eq!((b.width(), b.height()), (5, 3));
    }

    #[test]
    fn test_crop_copies_region() {
        let raster = raster_with_block(10, 8, 2, 3, 6, 5);
        let result = crop_transparent_borders(raster, 8);

        assert_eq!((result.raster.width, result.raster.height), (5, 3));
        // First pixel comes from (2, 3)
        assert_eq!(&result.raster.pixels[0..4], &[2, 3, 7, 255]);
        // Last pixel comes from (6, 5)
        let n = result.raster.pixels.len();
        assert_eq!(&result.raster.pixels[n - 4..], &[6, 5, 7, 255]);
    }

    #[test]
    fn test_fully_opaque_spans_image() {
        let raster = Raster::filled(7, 4, [1, 2, 3, 255]);
        let result = crop_transparent_borders(raster.clone(), 8);

        let b = result.crop_box.unwrap();
        assert!(b.is_full());
        assert_eq!(result.raster, raster);
    }

    #[test]
    fn test_fully_transparent_returns_input() {
        let raster = Raster::filled(5, 5, [255, 255, 255, 0]);
        let result = crop_transparent_borders(raster.clone(), 8);

        assert!(result.crop_box.is_none());
        assert_eq!(result.raster, raster);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut raster = Raster::filled(3, 3, [0, 0, 0, 8]);
        assert!(find_alpha_bounds(&raster, 8).is_none());

        raster.pixels[4 * 4 + 3] = 9; // center pixel
        let b = find_alpha_bounds(&raster, 8).unwrap();
        assert_eq!((b.left, b.top, b.right, b.bottom), (1, 1, 1, 1));
    }

    #[test]
    fn test_single_pixel_yields_one_by_one() {
        let raster = raster_with_block(9, 9, 8, 0, 8, 0);
        let result = crop_transparent_borders(raster, 0);

        assert_eq!((result.raster.width, result.raster.height), (1, 1));
        assert_eq!(result.raster.pixels.len(), 4);
    }

    #[test]
    fn test_empty_raster_has_no_bounds() {
        assert!(find_alpha_bounds(&Raster::new(0, 0, vec![]), 8).is_none());
    }

    #[test]
    fn test_bounds_ignore_mismatched_buffer() {
        let short = Raster {
            width: 4,
            height: 4,
            pixels: vec![255u8; 4 * 4 + 3],
        };
        let bounds = find_alpha_bounds(&short, 8).unwrap();
        assert_eq!((bounds.bottom, bounds.right), (0, 3));

        let long = Raster {
            width: 2,
            height: 1,
            pixels: vec![255u8; 2 * 3 * 4],
        };
        assert_eq!(find_alpha_bounds(&long, 8).unwrap().bottom, 0);
    }

    #[test]
    fn test_crop_encoded_trims_png() {
        let raster = raster_with_block(20, 10, 4, 2, 9, 7);
        let png = encode_png(&raster.pixels, 20, 10).unwrap();

        let processed = crop_encoded(png, 8);

        assert!(processed.crop_failure.is_none());
        assert_eq!(processed.width, Some(6));
        assert_eq!(processed.height, Some(6));
        assert_eq!(processed.crop_box.unwrap().left, 4);

        let decoded = image::load_from_memory(&processed.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 6));
    }

    #[test]
    fn test_crop_encoded_transparent_keeps_bytes() {
        let raster = Raster::filled(4, 4, [0, 0, 0, 0]);
        let png = encode_png(&raster.pixels, 4, 4).unwrap();

        let processed = crop_encoded(png.clone(), 8);

        assert_eq!(processed.png, png);
        assert_eq!(processed.width, Some(4));
        assert!(processed.crop_box.is_none());
        assert!(processed.crop_failure.is_none());
    }

    #[test]
    fn test_crop_encoded_failure_keeps_original() {
        let garbage = vec![1u8, 2, 3, 4, 5];
        let processed = crop_encoded(garbage.clone(), 8);

        assert_eq!(processed.png, garbage);
        assert_eq!(processed.width, None);
        assert!(processed.crop_box.is_none());
        assert!(matches!(processed.crop_failure, Some(CropError::Decode(_))));
    }

    #[test]
    fn test_processed_data_url() {
        let processed = crop_encoded(vec![9, 9], 8);
        assert!(processed.to_data_url().starts_with("data:image/png;base64,"));
    }
}
