//! Gesture state machine for the design overlay.
//!
//! The engine owns the one authoritative [`NormalizedTransform`] and accepts
//! pointer events for two gestures:
//!
//! - **Drag** (pointer-down on the overlay): moves the center, keeps width
//! - **Resize** (pointer-down on the resize handle): changes width from
//!   horizontal displacement, keeps the center
//!
//! ```text
//!          pointer_down(Overlay)            pointer_up / cancel / teardown
//!   Idle ────────────────────────> Dragging ──────────────────────────────> Idle
//!   Idle ────────────────────────> Resizing ──────────────────────────────> Idle
//!          pointer_down(ResizeHandle)
//! ```
//!
//! Only one gesture can be active. Every candidate produced by a move goes
//! through [`clamp_transform`] before it becomes the new state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{clamp_transform, ContainerRect, NormalizedTransform};
use crate::config::{DesignerConfig, WidthLimits};

/// Cursor shown globally while a gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureCursor {
    Grabbing,
    NwseResize,
}

impl GestureCursor {
    /// CSS cursor keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            GestureCursor::Grabbing => "grabbing",
            GestureCursor::NwseResize => "nwse-resize",
        }
    }
}

/// Page-wide side effects held for the duration of a gesture (cursor
/// override, text-selection suppression).
///
/// The engine calls `acquire` exactly once when a gesture starts and
/// `release` exactly once when it ends, including when the engine is
/// dropped mid-gesture.
pub trait InteractionOverrides {
    fn acquire(&mut self, cursor: GestureCursor);
    fn release(&mut self);
}

/// Overrides implementation for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl InteractionOverrides for NoOverrides {
    fn acquire(&mut self, _cursor: GestureCursor) {}
    fn release(&mut self) {}
}

/// Which element a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    Overlay,
    ResizeHandle,
}

/// A pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer_id: i32,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(pointer_id: i32, x: f64, y: f64) -> Self {
        Self { pointer_id, x, y }
    }
}

/// Everything captured once at gesture start.
///
/// The container rect is not re-measured during the gesture, so moves are
/// computed against a stable reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureStart {
    pub pointer_id: i32,
    pub start_x: f64,
    pub start_y: f64,
    pub container: ContainerRect,
    pub transform: NormalizedTransform,
}

/// Gesture state. A single value makes concurrent gestures unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(GestureStart),
    Resizing(GestureStart),
}

impl GestureState {
    pub fn is_active(&self) -> bool {
        !matches!(self, GestureState::Idle)
    }

    fn start(&self) -> Option<&GestureStart> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging(start) | GestureState::Resizing(start) => Some(start),
        }
    }
}

/// CSS placement of the overlay for the on-screen preview.
///
/// The overlay is positioned by its center (`translate(-50%, -50%)`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayStyle {
    pub left_percent: f64,
    pub top_percent: f64,
    pub width_percent: f64,
    pub cursor: String,
    pub active: bool,
}

/// Owns the overlay transform and drives it from pointer gestures.
pub struct OverlayTransformEngine<O: InteractionOverrides = NoOverrides> {
    transform: NormalizedTransform,
    default_transform: NormalizedTransform,
    limits: WidthLimits,
    aspect_ratio: f64,
    container: ContainerRect,
    design_loaded: bool,
    error_shown: bool,
    generating: bool,
    state: GestureState,
    overrides: O,
}

impl OverlayTransformEngine<NoOverrides> {
    /// Create an engine without page-wide side effects.
    pub fn headless(config: &DesignerConfig) -> Self {
        Self::new(config, NoOverrides)
    }
}

impl<O: InteractionOverrides> OverlayTransformEngine<O> {
    pub fn new(config: &DesignerConfig, overrides: O) -> Self {
        Self {
            transform: config.default_transform,
            default_transform: config.default_transform,
            limits: config.width_limits,
            aspect_ratio: 1.0,
            container: ContainerRect::default(),
            design_loaded: false,
            error_shown: false,
            generating: false,
            state: GestureState::Idle,
            overrides,
        }
    }

    /// Current authoritative transform.
    pub fn transform(&self) -> NormalizedTransform {
        self.transform
    }

    /// Current design aspect ratio (height / width).
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn container(&self) -> ContainerRect {
        self.container
    }

    pub fn overrides(&self) -> &O {
        &self.overrides
    }

    /// Gestures are accepted only with a loaded design, no error on
    /// screen and no generation in flight.
    pub fn is_editable(&self) -> bool {
        self.design_loaded && !self.error_shown && !self.generating
    }

    /// A new design replaced the previous one. Its natural size is not
    /// known yet, so the aspect ratio falls back to 1 until
    /// [`set_design_size`](Self::set_design_size) is called.
    pub fn load_design(&mut self) {
        self.end_gesture();
        self.design_loaded = true;
        self.aspect_ratio = 1.0;
        self.transform = self.clamp(self.default_transform);
    }

    /// Record the decoded design's natural size.
    pub fn set_design_size(&mut self, natural_width: u32, natural_height: u32) {
        self.aspect_ratio = if natural_width > 0 && natural_height > 0 {
            natural_height as f64 / natural_width as f64
        } else {
            1.0
        };
        if !self.state.is_active() {
            self.transform = self.clamp(self.transform);
        }
    }

    /// The design was discarded.
    pub fn clear_design(&mut self) {
        self.end_gesture();
        self.design_loaded = false;
        self.aspect_ratio = 1.0;
        self.transform = self.default_transform;
    }

    pub fn set_error_shown(&mut self, shown: bool) {
        self.error_shown = shown;
        if !self.is_editable() {
            self.end_gesture();
        }
    }

    pub fn set_generating(&mut self, generating: bool) {
        self.generating = generating;
        if !self.is_editable() {
            self.end_gesture();
        }
    }

    /// Record a fresh layout measurement of the container.
    ///
    /// An active gesture keeps the rect it captured at start; the stored
    /// transform is re-clamped only while idle.
    pub fn set_container_rect(&mut self, rect: ContainerRect) {
        self.container = rect;
        if !self.state.is_active() {
            self.transform = self.clamp(self.transform);
        }
    }

    /// Replace the transform outside of a gesture (e.g. restoring a saved
    /// placement). Ignored while a gesture is active.
    pub fn set_transform(&mut self, candidate: NormalizedTransform) -> bool {
        if self.state.is_active() {
            return false;
        }
        self.transform = self.clamp(candidate);
        true
    }

    /// Handle a pointer-down. Returns `true` if a gesture started.
    ///
    /// Ignored while another gesture is active, when the design is not
    /// editable, or before the container has been laid out.
    pub fn pointer_down(&mut self, target: PointerTarget, event: PointerEvent) -> bool {
        if self.state.is_active() || !self.is_editable() || !self.container.size().is_measured() {
            return false;
        }

        let start = GestureStart {
            pointer_id: event.pointer_id,
            start_x: event.x,
            start_y: event.y,
            container: self.container,
            transform: self.transform,
        };
        let cursor = match target {
            PointerTarget::Overlay => {
                self.state = GestureState::Dragging(start);
                GestureCursor::Grabbing
            }
            PointerTarget::ResizeHandle => {
                self.state = GestureState::Resizing(start);
                GestureCursor::NwseResize
            }
        };
        self.overrides.acquire(cursor);
        debug!(?target, pointer_id = event.pointer_id, "overlay gesture started");
        true
    }

    /// Handle a pointer-move. Returns `true` if the transform was updated.
    pub fn pointer_move(&mut self, event: PointerEvent) -> bool {
        let candidate = match &self.state {
            GestureState::Idle => return false,
            GestureState::Dragging(start) if start.pointer_id == event.pointer_id => {
                let dx = (event.x - start.start_x) / start.container.width;
                let dy = (event.y - start.start_y) / start.container.height;
                NormalizedTransform {
                    center_x: start.transform.center_x + dx,
                    center_y: start.transform.center_y + dy,
                    width: start.transform.width,
                }
            }
            GestureState::Resizing(start) if start.pointer_id == event.pointer_id => {
                let delta = (event.x - start.start_x) / start.container.width;
                NormalizedTransform {
                    center_x: start.transform.center_x,
                    center_y: start.transform.center_y,
                    width: start.transform.width + delta,
                }
            }
            _ => return false,
        };

        self.transform = self.clamp(candidate);
        true
    }

    /// Handle a pointer-up. Only the pointer that started the gesture ends it.
    pub fn pointer_up(&mut self, event: PointerEvent) {
        if self.state.start().map(|s| s.pointer_id) == Some(event.pointer_id) {
            self.end_gesture();
        }
    }

    /// Handle a pointer-cancel.
    pub fn pointer_cancel(&mut self, event: PointerEvent) {
        self.pointer_up(event);
    }

    /// End any active gesture and release the page-wide overrides.
    ///
    /// Also runs on drop, so a torn-down view never leaves the cursor or
    /// selection override behind.
    pub fn teardown(&mut self) {
        self.end_gesture();
    }

    /// CSS placement for the on-screen preview.
    pub fn overlay_style(&self) -> OverlayStyle {
        let cursor = match self.state {
            GestureState::Dragging(_) => GestureCursor::Grabbing.as_css(),
            _ => "grab",
        };
        OverlayStyle {
            left_percent: self.transform.center_x * 100.0,
            top_percent: self.transform.center_y * 100.0,
            width_percent: self.transform.width * 100.0,
            cursor: cursor.to_string(),
            active: self.state.is_active(),
        }
    }

    fn clamp(&self, candidate: NormalizedTransform) -> NormalizedTransform {
        clamp_transform(candidate, self.container.size(), self.aspect_ratio, self.limits)
    }

    fn end_gesture(&mut self) {
        if self.state.is_active() {
            self.state = GestureState::Idle;
            self.overrides.release();
            debug!("overlay gesture ended");
        }
    }
}

impl<O: InteractionOverrides> Drop for OverlayTransformEngine<O> {
    fn drop(&mut self) {
        self.end_gesture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPS: f64 = 1e-9;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Acquire(GestureCursor),
        Release,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Call>>>);

    impl InteractionOverrides for Recorder {
        fn acquire(&mut self, cursor: GestureCursor) {
            self.0.borrow_mut().push(Call::Acquire(cursor));
        }
        fn release(&mut self) {
            self.0.borrow_mut().push(Call::Release);
        }
    }

    fn editable_engine() -> OverlayTransformEngine<Recorder> {
        let mut engine = OverlayTransformEngine::new(&DesignerConfig::default(), Recorder::default());
        engine.set_container_rect(ContainerRect::new(100.0, 50.0, 400.0, 500.0));
        engine.load_design();
        engine
    }

    fn at(x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(1, x, y)
    }

    #[test]
    fn test_not_editable_without_design() {
        let mut engine = OverlayTransformEngine::headless(&DesignerConfig::default());
        engine.set_container_rect(ContainerRect::new(0.0, 0.0, 400.0, 500.0));
        assert!(!engine.pointer_down(PointerTarget::Overlay, at(10.0, 10.0)));
        assert_eq!(engine.state(), &GestureState::Idle);
    }

    #[test]
    fn test_not_editable_with_error_or_generation() {
        let mut engine = editable_engine();
        engine.set_error_shown(true);
        assert!(!engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0)));

        engine.set_error_shown(false);
        engine.set_generating(true);
        assert!(!engine.pointer_down(PointerTarget::ResizeHandle, at(0.0, 0.0)));

        engine.set_generating(false);
        assert!(engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0)));
    }

    #[test]
    fn test_unmeasured_container_rejects_gesture() {
        let mut engine = OverlayTransformEngine::headless(&DesignerConfig::default());
        engine.load_design();
        assert!(!engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0)));
    }

    #[test]
    fn test_drag_moves_center_only() {
        let mut engine = editable_engine();
        let before = engine.transform();

        assert!(engine.pointer_down(PointerTarget::Overlay, at(200.0, 200.0)));
        assert!(engine.pointer_move(at(240.0, 150.0)));

        let after = engine.transform();
        assert!((after.center_x - (before.center_x + 40.0 / 400.0)).abs() < EPS);
        assert!((after.center_y - (before.center_y - 50.0 / 500.0)).abs() < EPS);
        assert_eq!(after.width, before.width);
    }

    #[test]
    fn test_drag_deltas_are_relative_to_gesture_start() {
        let mut engine = editable_engine();
        let before = engine.transform();

        engine.pointer_down(PointerTarget::Overlay, at(200.0, 200.0));
        engine.pointer_move(at(260.0, 200.0));
        engine.pointer_move(at(220.0, 200.0));

        assert!((engine.transform().center_x - (before.center_x + 20.0 / 400.0)).abs() < EPS);
    }

    #[test]
    fn test_drag_is_clamped() {
        let mut engine = editable_engine();
        engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0));
        engine.pointer_move(at(-5000.0, 5000.0));

        let t = engine.transform();
        assert!((t.center_x - t.width / 2.0).abs() < EPS);
        let half_h = t.width * 400.0 / 500.0 / 2.0;
        assert!((t.center_y - (1.0 - half_h)).abs() < EPS);
    }

    #[test]
    fn test_resize_changes_width_only() {
        let mut engine = editable_engine();
        let before = engine.transform();

        assert!(engine.pointer_down(PointerTarget::ResizeHandle, at(300.0, 300.0)));
        engine.pointer_move(at(340.0, 999.0));

        let after = engine.transform();
        assert!((after.width - (before.width + 40.0 / 400.0)).abs() < EPS);
        assert_eq!(after.center_x, before.center_x);
        assert_eq!(after.center_y, before.center_y);
    }

    #[test]
    fn test_resize_respects_width_limits() {
        let mut engine = editable_engine();
        engine.pointer_down(PointerTarget::ResizeHandle, at(300.0, 300.0));
        engine.pointer_move(at(-3000.0, 300.0));
        assert!((engine.transform().width - 0.2).abs() < EPS);

        engine.pointer_move(at(3000.0, 300.0));
        assert!((engine.transform().width - 0.65).abs() < EPS);
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let mut engine = editable_engine();
        let before = engine.transform();

        assert!(engine.pointer_down(PointerTarget::Overlay, at(200.0, 200.0)));
        assert!(!engine.pointer_down(PointerTarget::Overlay, PointerEvent::new(2, 0.0, 0.0)));
        assert!(!engine.pointer_down(PointerTarget::ResizeHandle, at(0.0, 0.0)));
        assert!(matches!(engine.state(), GestureState::Dragging(_)));

        // Moves from the second pointer do not count
        assert!(!engine.pointer_move(PointerEvent::new(2, 900.0, 900.0)));
        engine.pointer_move(at(220.0, 210.0));

        let after = engine.transform();
        assert!((after.center_x - (before.center_x + 20.0 / 400.0)).abs() < EPS);
        assert!((after.center_y - (before.center_y + 10.0 / 500.0)).abs() < EPS);
    }

    #[test]
    fn test_pointer_up_returns_to_idle() {
        let mut engine = editable_engine();
        engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0));

        // A different pointer lifting does not end the gesture
        engine.pointer_up(PointerEvent::new(7, 0.0, 0.0));
        assert!(engine.state().is_active());

        engine.pointer_up(at(0.0, 0.0));
        assert_eq!(engine.state(), &GestureState::Idle);
        assert!(!engine.pointer_move(at(50.0, 50.0)));
    }

    #[test]
    fn test_overrides_acquired_and_released() {
        let mut engine = editable_engine();
        let calls = engine.overrides().0.clone();

        engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0));
        engine.pointer_cancel(at(0.0, 0.0));
        engine.pointer_down(PointerTarget::ResizeHandle, at(0.0, 0.0));
        engine.pointer_up(at(0.0, 0.0));

        assert_eq!(
            *calls.borrow(),
            vec![
                Call::Acquire(GestureCursor::Grabbing),
                Call::Release,
                Call::Acquire(GestureCursor::NwseResize),
                Call::Release,
            ]
        );
    }

    #[test]
    fn test_drop_mid_gesture_releases_overrides() {
        let mut engine = editable_engine();
        let calls = engine.overrides().0.clone();
        engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0));

        drop(engine);

        assert_eq!(calls.borrow().last(), Some(&Call::Release));
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_teardown_when_idle_does_not_release() {
        let mut engine = editable_engine();
        let calls = engine.overrides().0.clone();
        engine.teardown();
        drop(engine);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_error_during_gesture_ends_it() {
        let mut engine = editable_engine();
        engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0));
        engine.set_error_shown(true);
        assert_eq!(engine.state(), &GestureState::Idle);
    }

    #[test]
    fn test_load_design_resets_transform() {
        let mut engine = editable_engine();
        engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0));
        engine.pointer_move(at(80.0, 0.0));
        engine.pointer_up(at(80.0, 0.0));
        assert_ne!(engine.transform(), NormalizedTransform::default());

        engine.load_design();
        assert_eq!(engine.transform(), NormalizedTransform::default());
        assert_eq!(engine.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_design_size_sets_aspect_and_reclamps() {
        let mut engine = editable_engine();
        engine.set_transform(NormalizedTransform::new(0.5, 0.2, 0.6));
        engine.set_design_size(100, 200);

        assert!((engine.aspect_ratio() - 2.0).abs() < EPS);
        // 0.6 * 400 * 2 = 480px of 500 -> half height 0.48
        assert!((engine.transform().center_y - 0.48).abs() < EPS);

        engine.set_design_size(0, 200);
        assert_eq!(engine.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_overlay_style() {
        let mut engine = editable_engine();
        let style = engine.overlay_style();
        assert!((style.left_percent - 50.0).abs() < EPS);
        assert!((style.top_percent - 45.0).abs() < EPS);
        assert!((style.width_percent - 46.0).abs() < EPS);
        assert_eq!(style.cursor, "grab");

        engine.pointer_down(PointerTarget::Overlay, at(0.0, 0.0));
        assert_eq!(engine.overlay_style().cursor, "grabbing");
        assert!(engine.overlay_style().active);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn engine(width: f64, height: f64) -> OverlayTransformEngine {
        let mut engine = OverlayTransformEngine::headless(&DesignerConfig::default());
        engine.set_container_rect(ContainerRect::new(0.0, 0.0, width, height));
        engine.load_design();
        engine
    }

    proptest! {
        /// Property: An unclamped drag shifts the center by dx/cw, dy/ch.
        #[test]
        fn prop_small_drag_is_exact(
            (cw, ch) in (300.0f64..=600.0, 400.0f64..=1200.0),
            (dx, dy) in (-0.05f64..=0.05, -0.05f64..=0.05),
        ) {
            // Container at most 1.5x wider than tall: the default placement
            // has room to move 0.05 in every direction.
            let mut engine = engine(cw, ch);
            let before = engine.transform();
            prop_assert_eq!(before, NormalizedTransform::default());

            engine.pointer_down(PointerTarget::Overlay, PointerEvent::new(1, 100.0, 100.0));
            engine.pointer_move(PointerEvent::new(1, 100.0 + dx * cw, 100.0 + dy * ch));

            let after = engine.transform();
            prop_assert!((after.center_x - (before.center_x + dx)).abs() < 1e-9);
            prop_assert!((after.center_y - (before.center_y + dy)).abs() < 1e-9);
            prop_assert_eq!(after.width, before.width);
        }

        /// Property: Resizing never moves the center.
        #[test]
        fn prop_resize_keeps_center(
            (cw, ch) in (300.0f64..=1200.0, 300.0f64..=1200.0),
            dx in -2000.0f64..=2000.0,
        ) {
            let mut engine = engine(cw, ch);
            let before = engine.transform();

            engine.pointer_down(PointerTarget::ResizeHandle, PointerEvent::new(1, 0.0, 0.0));
            engine.pointer_move(PointerEvent::new(1, dx, 0.0));

            let after = engine.transform();
            let expected = WidthLimits::default().clamp(before.width + dx / cw);
            prop_assert!((after.width - expected).abs() < 1e-9);

            // The center only moves if the new size forces it back inside
            let half_h = after.width * cw / ch / 2.0;
            if half_h <= before.center_y && before.center_y <= 1.0 - half_h {
                prop_assert_eq!(after.center_y, before.center_y);
            }
            prop_assert_eq!(after.center_x, before.center_x);
        }
    }
}
