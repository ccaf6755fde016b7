//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode PNG/JPEG/WebP bytes, honouring EXIF orientation
//! - [`decode_data_url`] - Decode a base64 `data:` URL
//! - [`data_url_bytes`] - Extract the raw bytes of a `data:` URL
//! - [`bytes_to_data_url`] - Wrap bytes in a `data:` URL
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, decode_data_url } from '@petprint/wasm';
//!
//! const shirt = decode_image(new Uint8Array(await mockup.arrayBuffer()));
//! const design = decode_data_url(result.imageUrl);
//! ```

use crate::types::{js_error, JsRaster};
use petprint_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an encoded image to RGBA.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image, the data is
/// corrupted, or the image has zero width or height.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRaster, JsValue> {
    decode::decode_raster(bytes)
        .map(JsRaster::from_raster)
        .map_err(js_error)
}

/// Decode the image carried by a base64 `data:` URL.
#[wasm_bindgen]
pub fn decode_data_url(url: &str) -> Result<JsRaster, JsValue> {
    let data = decode::parse_data_url(url).map_err(js_error)?;
    decode_image(&data.bytes)
}

/// Raw payload bytes of a base64 `data:` URL.
#[wasm_bindgen]
pub fn data_url_bytes(url: &str) -> Result<Vec<u8>, JsValue> {
    decode::parse_data_url(url)
        .map(|data| data.bytes)
        .map_err(js_error)
}

/// Format bytes as a base64 `data:` URL.
#[wasm_bindgen]
pub fn bytes_to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    decode::to_data_url(mime_type, bytes)
}
