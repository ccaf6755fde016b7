//! Transform clamping.
//!
//! The single routine in this file enforces the placement invariant: the
//! width stays within its limits and the overlay rectangle never crosses the
//! container edges.

use super::{ContainerSize, NormalizedTransform};
use crate::config::WidthLimits;

/// Clamp a candidate transform into the valid region.
///
/// # Arguments
///
/// * `candidate` - Unconstrained transform produced by a gesture
/// * `container` - Current container size in pixels
/// * `aspect_ratio` - Design height / width
/// * `limits` - Allowed overlay width range
///
/// # Behavior
///
/// - Width is clamped first; the half extents are derived from the clamped
///   width, so centers are always checked against the final size
/// - An unmeasured container (zero or non-finite size) returns the candidate
///   unchanged
/// - If the overlay cannot fit along an axis it is centered on that axis
/// - A non-positive or non-finite aspect ratio is treated as 1.0
pub fn clamp_transform(
    candidate: NormalizedTransform,
    container: ContainerSize,
    aspect_ratio: f64,
    limits: WidthLimits,
) -> NormalizedTransform {
    if !container.is_measured() {
        return candidate;
    }

    let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };

    let width = limits.clamp(candidate.width);
    let overlay_width_px = width * container.width;
    let overlay_height_px = overlay_width_px * aspect_ratio;
    let half_width = overlay_width_px / container.width / 2.0;
    let half_height = overlay_height_px / container.height / 2.0;

    NormalizedTransform {
        center_x: clamp_center(candidate.center_x, half_width),
        center_y: clamp_center(candidate.center_y, half_height),
        width,
    }
}

#[inline]
fn clamp_center(center: f64, half_extent: f64) -> f64 {
    if half_extent >= 0.5 {
        return 0.5;
    }
    center.max(half_extent).min(1.0 - half_extent)
}
