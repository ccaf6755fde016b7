//! PetPrint Core - Image compositing for the pet T-shirt designer
//!
//! This crate provides the raster side of the designer: trimming transparent
//! borders, background stripping through an external remover, interactive
//! placement of the design over the garment mockup, and flattening the
//! result into a downloadable PNG.

pub mod background;
pub mod compose;
pub mod config;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod error;
pub mod generation;
pub mod overlay;
pub mod workflow;

pub use background::{strip_background, BackgroundRemover, DesignSource, OutputFormat, StripError};
pub use compose::{compose, compose_with_filter, design_rect, export_composite, ComposeError, DesignRect};
pub use config::{DesignerConfig, WidthLimits};
pub use crop::{
    crop_encoded, crop_transparent_borders, find_alpha_bounds, CropBox, CropError, CropResult,
    ProcessedDesign,
};
pub use decode::{decode_raster, DecodeError, FilterType, Raster};
pub use encode::{encode_png, export_png, EncodeError, ExportedFile};
pub use error::ExternalServiceError;
pub use generation::{DesignGenerator, DesignRequest, GeneratedDesign, SourceImage};
pub use overlay::{
    clamp_transform, ContainerRect, ContainerSize, NormalizedTransform, OverlayTransformEngine,
};
pub use workflow::{finalize_design, DesignResult, ProcessedMetadata};
