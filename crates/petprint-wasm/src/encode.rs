//! PNG encoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_png, export_design_png } from '@petprint/wasm';
//!
//! const png = encode_png(imageData.data, imageData.width, imageData.height);
//! const file = export_design_png(design);
//! download(new Blob([file.bytes], { type: file.mimeType }), file.fileName);
//! ```

use crate::types::{js_error, JsRaster};
use petprint_core::config::DesignerConfig;
use petprint_core::encode::{self, ExportedFile};
use wasm_bindgen::prelude::*;

/// A PNG ready to be downloaded.
#[wasm_bindgen]
pub struct JsExportedFile {
    inner: ExportedFile,
}

#[wasm_bindgen]
impl JsExportedFile {
    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.clone()
    }

    /// Encoded bytes (copied).
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    #[wasm_bindgen(js_name = toDataUrl)]
    pub fn to_data_url(&self) -> String {
        self.inner.to_data_url()
    }
}

impl JsExportedFile {
    pub(crate) fn from_exported(inner: ExportedFile) -> Self {
        Self { inner }
    }
}

/// Encode RGBA pixel data to PNG bytes.
///
/// # Errors
///
/// Returns an error if the pixel length doesn't match width * height * 4 or
/// either dimension is zero.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(js_error)
}

/// Export a background-stripped design as a standalone transparent PNG.
#[wasm_bindgen]
pub fn export_design_png(design: &JsRaster) -> Result<JsExportedFile, JsValue> {
    let config = DesignerConfig::default();
    encode::export_png(&design.to_raster(), &config.transparent_file_name)
        .map(JsExportedFile::from_exported)
        .map_err(js_error)
}
