//! WASM-compatible wrapper types for raster data.
//!
//! Rasters cross the boundary as RGBA: 4 bytes per pixel, row-major, the
//! same layout as canvas `ImageData`.

use petprint_core::config::DesignerConfig;
use petprint_core::decode::{FilterType, Raster};
use wasm_bindgen::prelude::*;

/// An RGBA raster for JavaScript.
///
/// # Memory Management
///
/// Pixels live in WASM memory. `pixels()` copies them out to a
/// `Uint8Array`; keep rasters on the WASM side between calls where possible.
#[wasm_bindgen]
pub struct JsRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRaster {
    /// Create a raster from dimensions and RGBA pixel data.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsRaster {
        JsRaster {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Height / width, used as the overlay aspect ratio.
    #[wasm_bindgen(getter)]
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.height as f64 / self.width as f64
        }
    }

    /// Returns RGBA pixel data as a Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsRaster {
    pub(crate) fn from_raster(raster: Raster) -> Self {
        Self {
            width: raster.width,
            height: raster.height,
            pixels: raster.pixels,
        }
    }

    /// Clones the pixel data. The buffer length is not checked here; core
    /// operations reject mismatched buffers with an error.
    pub(crate) fn to_raster(&self) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Convert a u8 filter value to the core FilterType.
///
/// 0 = Nearest, 1 = Bilinear, 2 = Lanczos3. Anything else falls back to
/// Lanczos3, the export default.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        1 => FilterType::Bilinear,
        _ => FilterType::Lanczos3,
    }
}

pub(crate) fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Read a partial config object; `undefined` and `null` give the defaults.
pub(crate) fn config_from_js(value: JsValue) -> Result<DesignerConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(DesignerConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

pub(crate) fn warn_console(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}
