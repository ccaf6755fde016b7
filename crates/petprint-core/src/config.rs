//! Designer configuration.
//!
//! Every tunable of the compositing core lives in [`DesignerConfig`]. The
//! struct deserializes with per-field defaults, so the UI layer can pass a
//! partial object and only override what it cares about.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;
use crate::overlay::NormalizedTransform;

/// Minimum alpha (exclusive) for a pixel to count as visible content.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 8;

/// Smallest overlay width, as a fraction of the container width.
pub const MIN_WIDTH_RATIO: f64 = 0.2;

/// Largest overlay width, as a fraction of the container width.
pub const MAX_WIDTH_RATIO: f64 = 0.65;

/// Download name of the composited mockup.
pub const COMPOSITE_FILE_NAME: &str = "tshirt-design.png";

/// Download name of a standalone background-stripped design.
pub const TRANSPARENT_DESIGN_FILE_NAME: &str = "design-transparent.png";

/// Number of most recent uploads sent to the generation collaborator.
pub const MAX_SOURCE_IMAGES: usize = 3;

/// Allowed range for the normalized overlay width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthLimits {
    /// Lower bound (0.0 to 1.0)
    pub min: f64,
    /// Upper bound (0.0 to 1.0)
    pub max: f64,
}

impl Default for WidthLimits {
    fn default() -> Self {
        Self {
            min: MIN_WIDTH_RATIO,
            max: MAX_WIDTH_RATIO,
        }
    }
}

impl WidthLimits {
    /// Clamp a width into the limits.
    ///
    /// The upper bound wins if the limits are inverted.
    #[inline]
    pub fn clamp(&self, width: f64) -> f64 {
        width.max(self.min).min(self.max)
    }
}

/// Configuration for the whole design pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Alpha threshold used when trimming transparent borders (0-255)
    pub alpha_threshold: u8,
    /// Overlay width limits
    pub width_limits: WidthLimits,
    /// Placement applied whenever a new design is loaded
    pub default_transform: NormalizedTransform,
    /// Filter used to resample the design during composition
    pub resample_filter: FilterType,
    /// Download name of the composited mockup
    pub composite_file_name: String,
    /// Download name of a stripped design
    pub transparent_file_name: String,
    /// Maximum number of uploads forwarded to the generation collaborator
    pub max_source_images: usize,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            width_limits: WidthLimits::default(),
            default_transform: NormalizedTransform::default(),
            resample_filter: FilterType::default(),
            composite_file_name: COMPOSITE_FILE_NAME.to_string(),
            transparent_file_name: TRANSPARENT_DESIGN_FILE_NAME.to_string(),
            max_source_images: MAX_SOURCE_IMAGES,
        }
    }
}

impl DesignerConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}
