//! Interactive placement of the design layer over the garment mockup.
//!
//! ## Coordinate System
//!
//! Placement is stored as a [`NormalizedTransform`]: the overlay's center and
//! width as fractions of the container. The same transform drives the
//! on-screen preview (container pixels) and the exported composite (base
//! image pixels), so the two never drift apart.
//!
//! - (0.0, 0.0) = top-left corner of the container
//! - (1.0, 1.0) = bottom-right corner
//! - overlay height = overlay width (in pixels) * design aspect ratio
//!
//! ## Components
//!
//! - [`clamp_transform`]: pure invariant enforcer, usable without any UI
//! - [`OverlayTransformEngine`]: gesture state machine that owns the
//!   authoritative transform

mod clamp;
mod engine;

pub use clamp::clamp_transform;
pub use engine::{
    GestureCursor, GestureStart, GestureState, InteractionOverrides, NoOverrides,
    OverlayStyle, OverlayTransformEngine, PointerEvent, PointerTarget,
};

use serde::{Deserialize, Serialize};

/// Placement of the design layer, in fractions of the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransform {
    /// Horizontal center (0.0 to 1.0)
    pub center_x: f64,
    /// Vertical center (0.0 to 1.0)
    pub center_y: f64,
    /// Overlay width relative to container width
    pub width: f64,
}

impl Default for NormalizedTransform {
    fn default() -> Self {
        Self {
            center_x: 0.5,
            center_y: 0.45,
            width: 0.46,
        }
    }
}

impl NormalizedTransform {
    pub fn new(center_x: f64, center_y: f64, width: f64) -> Self {
        Self {
            center_x,
            center_y,
            width,
        }
    }
}

/// Measured size of the container the overlay is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// False until layout has produced a positive, finite size.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// On-screen rectangle of the container, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn size(&self) -> ContainerSize {
        ContainerSize::new(self.width, self.height)
    }
}
