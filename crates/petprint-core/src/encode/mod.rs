//! Raster encoding for PetPrint exports.
//!
//! This module provides functionality for:
//! - Encoding RGBA rasters to PNG (the only export format)
//! - Packaging encoded bytes as named, downloadable files

mod png;

pub use png::{encode_png, encode_raster_png, export_png, EncodeError, ExportedFile, PNG_MIME_TYPE};
