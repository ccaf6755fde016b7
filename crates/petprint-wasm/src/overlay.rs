//! Overlay placement WASM bindings.
//!
//! Wraps the core gesture engine and wires its page-wide overrides to the
//! document body's inline style: while a gesture is active the body cursor
//! follows the gesture and text selection is disabled.
//!
//! # Example
//!
//! ```typescript
//! import { JsOverlayEngine } from '@petprint/wasm';
//!
//! const engine = new JsOverlayEngine();
//! engine.load_design();
//! engine.set_design_size(img.naturalWidth, img.naturalHeight);
//!
//! const r = container.getBoundingClientRect();
//! engine.set_container_rect(r.left, r.top, r.width, r.height);
//!
//! overlay.onpointerdown = (e) => engine.pointer_down_overlay(e.pointerId, e.clientX, e.clientY);
//! window.onpointermove = (e) => engine.pointer_move(e.pointerId, e.clientX, e.clientY) && render();
//! window.onpointerup = (e) => engine.pointer_up(e.pointerId, e.clientX, e.clientY);
//! ```

use crate::types::{config_from_js, js_error, warn_console};
use petprint_core::config::DesignerConfig;
use petprint_core::overlay::{
    ContainerRect, GestureCursor, InteractionOverrides, OverlayTransformEngine, PointerEvent,
    PointerTarget,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Applies gesture overrides to `document.body.style`, restoring the
/// previous inline values on release.
#[derive(Default)]
pub(crate) struct BodyStyleOverrides {
    saved: Option<SavedStyle>,
}

struct SavedStyle {
    cursor: String,
    user_select: String,
}

fn body_style() -> Option<web_sys::CssStyleDeclaration> {
    Some(web_sys::window()?.document()?.body()?.style())
}

/// Warns on the console when a body style update was rejected. Returns
/// whether the update went through.
fn report_style_update(property: &str, result: Result<(), JsValue>) -> bool {
    match result {
        Ok(()) => true,
        Err(error) => {
            let reason = error.as_string().unwrap_or_else(|| format!("{error:?}"));
            warn_console(&format!("Could not update body style `{property}`: {reason}"));
            false
        }
    }
}

impl InteractionOverrides for BodyStyleOverrides {
    fn acquire(&mut self, cursor: GestureCursor) {
        let Some(style) = body_style() else {
            return;
        };
        if self.saved.is_none() {
            self.saved = Some(SavedStyle {
                cursor: style.get_property_value("cursor").unwrap_or_default(),
                user_select: style.get_property_value("user-select").unwrap_or_default(),
            });
        }
        report_style_update("cursor", style.set_property("cursor", cursor.as_css()));
        report_style_update("user-select", style.set_property("user-select", "none"));
    }

    fn release(&mut self) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        let Some(style) = body_style() else {
            return;
        };
        for (name, value) in [("cursor", saved.cursor), ("user-select", saved.user_select)] {
            let result = if value.is_empty() {
                style.remove_property(name).map(|_| ())
            } else {
                style.set_property(name, &value)
            };
            report_style_update(name, result);
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransformJs {
    center_x: f64,
    center_y: f64,
    width: f64,
}

/// Gesture-driven placement of the design over the garment.
#[wasm_bindgen]
pub struct JsOverlayEngine {
    inner: OverlayTransformEngine<BodyStyleOverrides>,
    config: DesignerConfig,
}

impl Default for JsOverlayEngine {
    fn default() -> Self {
        Self::from_config(&DesignerConfig::default())
    }
}

impl JsOverlayEngine {
    pub(crate) fn from_config(config: &DesignerConfig) -> Self {
        Self {
            inner: OverlayTransformEngine::new(config, BodyStyleOverrides::default()),
            config: config.clone(),
        }
    }

    pub(crate) fn engine(&self) -> &OverlayTransformEngine<BodyStyleOverrides> {
        &self.inner
    }

    /// Config the engine was built with; export reads its file name and
    /// resample filter from here.
    pub(crate) fn config(&self) -> &DesignerConfig {
        &self.config
    }
}

#[wasm_bindgen]
impl JsOverlayEngine {
    /// Create an engine with the default limits and placement.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine from a partial config object, e.g.
    /// `{ width_limits: { min: 0.1, max: 0.8 } }`. The config also applies
    /// to `export_composite_png` calls made with this engine.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<JsOverlayEngine, JsValue> {
        Ok(Self::from_config(&config_from_js(config)?))
    }

    /// A new design is displayed; placement resets to the default.
    pub fn load_design(&mut self) {
        self.inner.load_design();
    }

    /// Natural size of the displayed design (sets the aspect ratio).
    pub fn set_design_size(&mut self, natural_width: u32, natural_height: u32) {
        self.inner.set_design_size(natural_width, natural_height);
    }

    pub fn clear_design(&mut self) {
        self.inner.clear_design();
    }

    pub fn set_error_shown(&mut self, shown: bool) {
        self.inner.set_error_shown(shown);
    }

    pub fn set_generating(&mut self, generating: bool) {
        self.inner.set_generating(generating);
    }

    /// Container bounding rect in client pixels.
    pub fn set_container_rect(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.inner
            .set_container_rect(ContainerRect::new(left, top, width, height));
    }

    /// Start a drag. Returns false when the gesture was refused.
    pub fn pointer_down_overlay(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.inner
            .pointer_down(PointerTarget::Overlay, PointerEvent::new(pointer_id, x, y))
    }

    /// Start a resize. Returns false when the gesture was refused.
    pub fn pointer_down_resize(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.inner
            .pointer_down(PointerTarget::ResizeHandle, PointerEvent::new(pointer_id, x, y))
    }

    /// Returns true when the transform changed.
    pub fn pointer_move(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.inner.pointer_move(PointerEvent::new(pointer_id, x, y))
    }

    pub fn pointer_up(&mut self, pointer_id: i32, x: f64, y: f64) {
        self.inner.pointer_up(PointerEvent::new(pointer_id, x, y));
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32, x: f64, y: f64) {
        self.inner.pointer_cancel(PointerEvent::new(pointer_id, x, y));
    }

    /// End any gesture and release the body overrides, e.g. on unmount.
    pub fn teardown(&mut self) {
        self.inner.teardown();
    }

    #[wasm_bindgen(getter)]
    pub fn center_x(&self) -> f64 {
        self.inner.transform().center_x
    }

    #[wasm_bindgen(getter)]
    pub fn center_y(&self) -> f64 {
        self.inner.transform().center_y
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.inner.transform().width
    }

    #[wasm_bindgen(getter)]
    pub fn aspect_ratio(&self) -> f64 {
        self.inner.aspect_ratio()
    }

    #[wasm_bindgen(getter)]
    pub fn active(&self) -> bool {
        self.inner.state().is_active()
    }

    #[wasm_bindgen(getter)]
    pub fn editable(&self) -> bool {
        self.inner.is_editable()
    }

    /// `{ centerX, centerY, width }`
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        let t = self.inner.transform();
        serde_wasm_bindgen::to_value(&TransformJs {
            center_x: t.center_x,
            center_y: t.center_y,
            width: t.width,
        })
        .map_err(js_error)
    }

    /// `{ left_percent, top_percent, width_percent, cursor, active }`
    pub fn style(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.overlay_style()).map_err(js_error)
    }
}
