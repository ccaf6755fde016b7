//! Mockup compositing WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { export_composite_png } from '@petprint/wasm';
//!
//! const file = export_composite_png(shirt, design, engine);
//! link.href = file.toDataUrl();
//! link.download = file.fileName; // "tshirt-design.png"
//! ```

use crate::encode::JsExportedFile;
use crate::overlay::JsOverlayEngine;
use crate::types::{filter_from_u8, js_error, JsRaster};
use petprint_core::compose;
use petprint_core::overlay::NormalizedTransform;
use wasm_bindgen::prelude::*;

/// Composite `design` over `base` at the given normalized placement.
///
/// # Arguments
///
/// * `center_x`, `center_y`, `width` - Placement as fractions of the base
/// * `aspect_ratio` - Design height / width
/// * `filter` - 0 = Nearest, 1 = Bilinear, 2 = Lanczos3
#[wasm_bindgen]
pub fn compose_design(
    base: &JsRaster,
    design: &JsRaster,
    center_x: f64,
    center_y: f64,
    width: f64,
    aspect_ratio: f64,
    filter: u8,
) -> Result<JsRaster, JsValue> {
    compose::compose_with_filter(
        &base.to_raster(),
        &design.to_raster(),
        &NormalizedTransform::new(center_x, center_y, width),
        aspect_ratio,
        filter_from_u8(filter),
    )
    .map(JsRaster::from_raster)
    .map_err(js_error)
}

/// Composite with the engine's current placement and export the result.
///
/// The file name and resample filter come from the engine's config
/// (`tshirt-design.png` and Lanczos3 by default).
#[wasm_bindgen]
pub fn export_composite_png(
    base: &JsRaster,
    design: &JsRaster,
    engine: &JsOverlayEngine,
) -> Result<JsExportedFile, JsValue> {
    let config = engine.config();
    let engine = engine.engine();
    compose::export_composite(
        &base.to_raster(),
        &design.to_raster(),
        &engine.transform(),
        engine.aspect_ratio(),
        config,
    )
    .map(JsExportedFile::from_exported)
    .map_err(js_error)
}

/// Design rectangle `{ x, y, width, height }` in base pixels.
#[wasm_bindgen]
pub fn design_rect(
    base_width: u32,
    base_height: u32,
    center_x: f64,
    center_y: f64,
    width: f64,
    aspect_ratio: f64,
) -> Result<JsValue, JsValue> {
    let rect = compose::design_rect(
        base_width,
        base_height,
        &NormalizedTransform::new(center_x, center_y, width),
        aspect_ratio,
    );
    serde_wasm_bindgen::to_value(&rect).map_err(js_error)
}
