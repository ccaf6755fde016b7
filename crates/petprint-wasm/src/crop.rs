//! Transparent border trimming WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { crop_transparent_borders, crop_encoded_png } from '@petprint/wasm';
//!
//! const result = crop_transparent_borders(raster, 8);
//! if (result.cropBox) {
//!   console.log(`Trimmed to ${result.raster.width}x${result.raster.height}`);
//! }
//!
//! const design = crop_encoded_png(strippedPngBytes, 8);
//! preview.src = design.toDataUrl();
//! ```

use crate::types::{js_error, JsRaster};
use petprint_core::config::DEFAULT_ALPHA_THRESHOLD;
use petprint_core::crop::{self, CropBox, ProcessedDesign};
use wasm_bindgen::prelude::*;

fn crop_box_to_js(crop_box: Option<CropBox>) -> Result<JsValue, JsValue> {
    match crop_box {
        Some(b) => serde_wasm_bindgen::to_value(&b).map_err(js_error),
        None => Ok(JsValue::NULL),
    }
}

/// Result of trimming a decoded raster.
#[wasm_bindgen]
pub struct JsCropResult {
    raster: JsRaster,
    crop_box: Option<CropBox>,
}

#[wasm_bindgen]
impl JsCropResult {
    /// Cropped raster, or a copy of the input when nothing was visible.
    #[wasm_bindgen(getter)]
    pub fn raster(&self) -> JsRaster {
        JsRaster::from_raster(self.raster.to_raster())
    }

    /// `{ left, top, right, bottom, original_width, original_height }`, or
    /// `null` for a fully transparent input.
    #[wasm_bindgen(getter, js_name = cropBox)]
    pub fn crop_box(&self) -> Result<JsValue, JsValue> {
        crop_box_to_js(self.crop_box)
    }

    #[wasm_bindgen(getter)]
    pub fn cropped(&self) -> bool {
        self.crop_box.is_some()
    }
}

/// Trim fully transparent borders from a raster.
///
/// Pixels count as visible when their alpha is strictly greater than
/// `alpha_threshold` (default 8).
#[wasm_bindgen]
pub fn crop_transparent_borders(raster: &JsRaster, alpha_threshold: Option<u8>) -> JsCropResult {
    let result = crop::crop_transparent_borders(
        raster.to_raster(),
        alpha_threshold.unwrap_or(DEFAULT_ALPHA_THRESHOLD),
    );
    JsCropResult {
        raster: JsRaster::from_raster(result.raster),
        crop_box: result.crop_box,
    }
}

/// An encoded design after border trimming.
#[wasm_bindgen]
pub struct JsProcessedDesign {
    inner: ProcessedDesign,
}

#[wasm_bindgen]
impl JsProcessedDesign {
    /// PNG bytes (copied).
    #[wasm_bindgen(getter)]
    pub fn png(&self) -> Vec<u8> {
        self.inner.png.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> Option<u32> {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> Option<u32> {
        self.inner.height
    }

    #[wasm_bindgen(getter, js_name = cropBox)]
    pub fn crop_box(&self) -> Result<JsValue, JsValue> {
        crop_box_to_js(self.inner.crop_box)
    }

    /// Why trimming failed, when `png` is the untrimmed input.
    #[wasm_bindgen(getter, js_name = cropFailure)]
    pub fn crop_failure(&self) -> Option<String> {
        self.inner.crop_failure.as_ref().map(ToString::to_string)
    }

    #[wasm_bindgen(js_name = toDataUrl)]
    pub fn to_data_url(&self) -> String {
        self.inner.to_data_url()
    }
}

impl JsProcessedDesign {
    pub(crate) fn from_processed(inner: ProcessedDesign) -> Self {
        Self { inner }
    }
}

/// Decode, trim and re-encode an image as PNG.
///
/// Never throws: if the bytes cannot be decoded or re-encoded, the input is
/// returned untouched with `cropFailure` set.
#[wasm_bindgen]
pub fn crop_encoded_png(bytes: Vec<u8>, alpha_threshold: Option<u8>) -> JsProcessedDesign {
    JsProcessedDesign::from_processed(crop::crop_encoded(
        bytes,
        alpha_threshold.unwrap_or(DEFAULT_ALPHA_THRESHOLD),
    ))
}
