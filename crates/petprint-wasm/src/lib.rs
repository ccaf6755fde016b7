//! PetPrint WASM - WebAssembly bindings for the T-shirt designer
//!
//! This crate exposes petprint-core to the browser front end.
//!
//! # Module Structure
//!
//! - `types` - RGBA raster wrapper shared by the bindings
//! - `decode` / `encode` - Image and `data:` URL decoding, PNG export
//! - `crop` - Transparent border trimming
//! - `background` - Background stripping through a JS remover function
//! - `overlay` - Gesture engine for placing the design
//! - `compose` - Flattening the design onto the mockup
//! - `generation` - Request body building and response parsing
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, JsOverlayEngine, export_composite_png } from '@petprint/wasm';
//!
//! await init();
//!
//! const shirt = decode_image(new Uint8Array(await mockup.arrayBuffer()));
//! const engine = new JsOverlayEngine();
//! // ... gestures ...
//! const file = export_composite_png(shirt, design, engine);
//! ```

use wasm_bindgen::prelude::*;

mod background;
mod compose;
mod crop;
mod decode;
mod encode;
mod generation;
mod overlay;
mod types;

pub use background::{finalize_design, strip_background};
pub use compose::{compose_design, design_rect, export_composite_png};
pub use crop::{crop_encoded_png, crop_transparent_borders, JsCropResult, JsProcessedDesign};
pub use decode::{bytes_to_data_url, data_url_bytes, decode_data_url, decode_image};
pub use encode::{encode_png, export_design_png, JsExportedFile};
pub use generation::{
    describe_http_failure, network_failure_error, parse_design_response, JsDesignRequest,
};
pub use overlay::JsOverlayEngine;
pub use types::JsRaster;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
