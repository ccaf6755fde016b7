//! Raster decoding for PetPrint.
//!
//! This module provides functionality for:
//! - Decoding PNG, JPEG and WebP bytes into RGBA rasters
//! - Correcting EXIF orientation on uploaded photos
//! - Unpacking `data:` URLs returned by the generation collaborator
//!
//! # Architecture
//!
//! Decoding is synchronous. Callers always hold a fully decoded [`Raster`]
//! before any pixel access, so the cropper and compositor never observe a
//! partially decoded buffer.

mod data_url;
mod raster;
mod types;

pub use data_url::{parse_data_url, to_data_url, DataUrl, DEFAULT_MIME_TYPE};
pub use raster::{decode_raster, decode_raster_no_orientation};
pub use types::{DecodeError, FilterType, Orientation, Raster};
