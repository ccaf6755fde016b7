//! Flattening the design layer onto the garment mockup.
//!
//! The exported image is always rendered at the base image's native
//! resolution. The normalized transform is re-interpreted against the base
//! image's pixel size rather than the on-screen container, which is what
//! keeps the export consistent with the preview regardless of how large the
//! preview happened to be.
//!
//! # Design Rectangle
//!
//! ```text
//! w  = transform.width    * base_width
//! h  = w * aspect_ratio
//! cx = transform.center_x * base_width
//! cy = transform.center_y * base_height
//! x  = cx - w / 2,  y = cy - h / 2
//! ```

use image::imageops;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::DesignerConfig;
use crate::decode::{FilterType, Raster};
use crate::encode::{export_png, EncodeError, ExportedFile};
use crate::overlay::NormalizedTransform;

/// Largest design rectangle, as a multiple of the base size on each axis,
/// that will be resampled.
pub const MAX_RECT_SCALE: f64 = 4.0;

/// Errors that can occur while compositing the export.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The base image has no usable size
    #[error("Base image has no usable dimensions ({width}x{height})")]
    EmptyBase { width: u32, height: u32 },

    /// The design image has no usable size
    #[error("Design image has no usable dimensions ({width}x{height})")]
    EmptyDesign { width: u32, height: u32 },

    /// The aspect ratio is zero, negative or not finite
    #[error("Invalid design aspect ratio: {0}")]
    InvalidAspectRatio(f64),

    /// The design rectangle rounds to zero pixels
    #[error("Design rectangle is degenerate ({width}x{height} px)")]
    DegenerateRect { width: f64, height: f64 },

    /// A transform field is NaN or infinite
    #[error("Design transform is not finite (center {center_x},{center_y}, width {width})")]
    NonFiniteTransform {
        center_x: f64,
        center_y: f64,
        width: f64,
    },

    /// The design rectangle is larger than the resample limit
    #[error("Design rectangle is too large ({width}x{height} px, limit {limit_width}x{limit_height})")]
    OversizedRect {
        width: f64,
        height: f64,
        limit_width: f64,
        limit_height: f64,
    },

    /// A pixel buffer does not match its declared dimensions
    #[error("Pixel buffer does not match raster dimensions")]
    InvalidBuffer,

    /// Encoding the flattened result failed
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Placement of the design in base-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DesignRect {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Map a normalized transform into the pixel space of a base image.
pub fn design_rect(
    base_width: u32,
    base_height: u32,
    transform: &NormalizedTransform,
    aspect_ratio: f64,
) -> DesignRect {
    let width = transform.width * base_width as f64;
    let height = width * aspect_ratio;
    let center_x = transform.center_x * base_width as f64;
    let center_y = transform.center_y * base_height as f64;

    DesignRect {
        x: center_x - width / 2.0,
        y: center_y - height / 2.0,
        width,
        height,
    }
}

/// Composite the design over the base with Lanczos3 resampling.
///
/// See [`compose_with_filter`].
pub fn compose(
    base: &Raster,
    design: &Raster,
    transform: &NormalizedTransform,
    aspect_ratio: f64,
) -> Result<Raster, ComposeError> {
    compose_with_filter(base, design, transform, aspect_ratio, FilterType::Lanczos3)
}

/// Composite the design over the base.
///
/// The base is copied unscaled; the design is resampled into its
/// [`DesignRect`] (rounded to whole pixels) and alpha-blended on top.
/// Parts of the design outside the base are clipped.
///
/// # Errors
///
/// Returns a [`ComposeError`] for empty rasters, an invalid aspect ratio or
/// a rectangle that rounds to zero pixels.
pub fn compose_with_filter(
    base: &Raster,
    design: &Raster,
    transform: &NormalizedTransform,
    aspect_ratio: f64,
    filter: FilterType,
) -> Result<Raster, ComposeError> {
    if base.is_empty() {
        return Err(ComposeError::EmptyBase {
            width: base.width,
            height: base.height,
        });
    }
    if design.is_empty() {
        return Err(ComposeError::EmptyDesign {
            width: design.width,
            height: design.height,
        });
    }
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return Err(ComposeError::InvalidAspectRatio(aspect_ratio));
    }

    let NormalizedTransform {
        center_x,
        center_y,
        width,
    } = *transform;
    if !(center_x.is_finite() && center_y.is_finite() && width.is_finite()) {
        return Err(ComposeError::NonFiniteTransform {
            center_x,
            center_y,
            width,
        });
    }

    let rect = design_rect(base.width, base.height, transform, aspect_ratio);
    let px_width = rect.width.round();
    let px_height = rect.height.round();
    if !(px_width >= 1.0 && px_height >= 1.0) {
        return Err(ComposeError::DegenerateRect {
            width: rect.width,
            height: rect.height,
        });
    }
    let limit_width = base.width as f64 * MAX_RECT_SCALE;
    let limit_height = base.height as f64 * MAX_RECT_SCALE;
    if px_width > limit_width || px_height > limit_height {
        return Err(ComposeError::OversizedRect {
            width: px_width,
            height: px_height,
            limit_width,
            limit_height,
        });
    }

    let mut canvas = base.to_rgba_image().ok_or(ComposeError::InvalidBuffer)?;
    let design_img = design.to_rgba_image().ok_or(ComposeError::InvalidBuffer)?;

    let x = rect.x.round();
    let y = rect.y.round();
    let outside = x >= base.width as f64
        || y >= base.height as f64
        || x + px_width <= 0.0
        || y + px_height <= 0.0;
    if outside {
        debug!(x, y, "design lies outside the base; nothing to composite");
        return Ok(Raster::from_rgba_image(canvas));
    }

    let (px_width, px_height) = (px_width as u32, px_height as u32);
    let resized = if (px_width, px_height) == design_img.dimensions() {
        design_img
    } else {
        imageops::resize(&design_img, px_width, px_height, filter.to_image_filter())
    };

    let (x, y) = (x as i64, y as i64);
    imageops::overlay(&mut canvas, &resized, x, y);

    debug!(x, y, width = px_width, height = px_height, "composited design onto base");
    Ok(Raster::from_rgba_image(canvas))
}

/// Composite and encode the result as the downloadable mockup file.
pub fn export_composite(
    base: &Raster,
    design: &Raster,
    transform: &NormalizedTransform,
    aspect_ratio: f64,
    config: &DesignerConfig,
) -> Result<ExportedFile, ComposeError> {
    let flattened = compose_with_filter(base, design, transform, aspect_ratio, config.resample_filter)?;
    Ok(export_png(&flattened, &config.composite_file_name)?)
}
