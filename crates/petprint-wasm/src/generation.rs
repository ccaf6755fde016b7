//! Generation request/response WASM bindings.
//!
//! The HTTP call stays in JavaScript; these bindings build its body and
//! interpret its response.
//!
//! # Example
//!
//! ```typescript
//! import {
//!   JsDesignRequest, parse_design_response, describe_http_failure, network_failure_error,
//! } from '@petprint/wasm';
//!
//! const request = new JsDesignRequest(prompt);
//! for (const file of uploads) {
//!   request.add_image(new Uint8Array(await file.arrayBuffer()), file.type);
//! }
//! let response;
//! try {
//!   response = await fetch(endpoint, { method: 'POST', body: request.build() });
//! } catch {
//!   throw network_failure_error();
//! }
//! if (!response.ok) {
//!   throw describe_http_failure(response.status, response.headers.get('content-type'), await response.text());
//! }
//! const design = parse_design_response(response.status, await response.text());
//! ```

use crate::types::{config_from_js, js_error};
use js_sys::Reflect;
use petprint_core::config::DesignerConfig;
use petprint_core::error::ExternalServiceError;
use petprint_core::generation::{self, DesignRequest, SourceImage};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Turn a collaborator failure into a JS `Error` carrying `status` and
/// `payload` properties.
fn external_to_js(error: ExternalServiceError) -> JsValue {
    let exception = js_sys::Error::new(&error.message);
    exception.set_name("ModelResponseError");
    if let Some(status) = error.status {
        let _ = Reflect::set(&exception, &"status".into(), &JsValue::from(status));
    }
    let payload = error
        .payload
        .as_ref()
        .and_then(|p| p.serialize(&serde_wasm_bindgen::Serializer::json_compatible()).ok())
        .unwrap_or(JsValue::NULL);
    let _ = Reflect::set(&exception, &"payload".into(), &payload);
    exception.into()
}

/// Accumulates uploads for a generation request.
#[wasm_bindgen]
pub struct JsDesignRequest {
    prompt: String,
    uploads: Vec<SourceImage>,
    max_images: usize,
}

#[wasm_bindgen]
impl JsDesignRequest {
    #[wasm_bindgen(constructor)]
    pub fn new(prompt: String) -> Self {
        Self::from_config(prompt, &DesignerConfig::default())
    }

    /// Create a request that honors `max_source_images` from a partial
    /// config object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(prompt: String, config: JsValue) -> Result<JsDesignRequest, JsValue> {
        Ok(Self::from_config(prompt, &config_from_js(config)?))
    }

    /// Add an uploaded photo. Only the most recent `max_source_images`
    /// (three by default) are sent.
    pub fn add_image(&mut self, bytes: Vec<u8>, mime_type: Option<String>) {
        self.uploads.push(SourceImage::new(bytes, mime_type));
    }

    #[wasm_bindgen(getter)]
    pub fn image_count(&self) -> usize {
        self.uploads.len()
    }

    /// JSON request body.
    ///
    /// Throws when no image has been added.
    pub fn build(&self) -> Result<String, JsValue> {
        self.body().map_err(js_error)
    }
}

impl JsDesignRequest {
    fn from_config(prompt: String, config: &DesignerConfig) -> Self {
        Self {
            prompt,
            uploads: Vec::new(),
            max_images: config.max_source_images,
        }
    }

    fn body(&self) -> Result<String, String> {
        let request = DesignRequest::new(&self.prompt, self.uploads.clone(), self.max_images)
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&request.payload()).map_err(|e| e.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedDesignJs<'a> {
    image_url: &'a str,
    raw: &'a serde_json::Value,
}

/// Read the generated image out of a successful response body.
///
/// Resolves to `{ imageUrl, raw }`; throws a `ModelResponseError` when the
/// body has no image data.
#[wasm_bindgen]
pub fn parse_design_response(status: u16, body: &str) -> Result<JsValue, JsValue> {
    let payload: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| external_to_js(ExternalServiceError::new(e.to_string()).with_status(status)))?;

    let design = generation::parse_design_response(status, payload).map_err(external_to_js)?;
    GeneratedDesignJs {
        image_url: &design.image_url,
        raw: &design.raw,
    }
    .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
    .map_err(js_error)
}

/// Build the `ModelResponseError` for a non-2xx response.
#[wasm_bindgen]
pub fn describe_http_failure(status: u16, content_type: Option<String>, body: &str) -> JsValue {
    external_to_js(generation::describe_http_failure(
        status,
        content_type.as_deref(),
        body,
    ))
}

/// Build the `ModelResponseError` for a request that never got a response,
/// e.g. when `fetch` itself rejects.
#[wasm_bindgen]
pub fn network_failure_error() -> JsValue {
    external_to_js(generation::network_failure())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_parse_design_response_object() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"data":"QUJD"}}]}}]}"#;
        let design = parse_design_response(200, body).unwrap();
        let url = Reflect::get(&design, &"imageUrl".into()).unwrap();
        assert_eq!(url.as_string().as_deref(), Some("data:image/png;base64,QUJD"));
    }

    #[wasm_bindgen_test]
    fn test_parse_design_response_error() {
        let err = parse_design_response(200, r#"{"error":{"message":"blocked"}}"#).unwrap_err();
        let err: js_sys::Error = err.into();
        assert_eq!(String::from(err.message()), "blocked");
        assert_eq!(String::from(err.name()), "ModelResponseError");
    }

    #[wasm_bindgen_test]
    fn test_network_failure_error() {
        let err: js_sys::Error = network_failure_error().into();
        assert_eq!(String::from(err.message()), "Model request failed: network error");
        assert_eq!(String::from(err.name()), "ModelResponseError");
        let status = Reflect::get(&err, &"status".into()).unwrap();
        assert!(status.is_undefined());
    }

    #[wasm_bindgen_test]
    fn test_with_config_limits_images() {
        let config = js_sys::JSON::parse(r#"{"max_source_images":2}"#).unwrap();
        let mut request = JsDesignRequest::with_config("corgi".to_string(), config).unwrap();
        for tag in 0..5u8 {
            request.add_image(vec![tag], Some("image/png".to_string()));
        }
        let body: serde_json::Value = serde_json::from_str(&request.build().unwrap()).unwrap();
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 3);
    }

    #[wasm_bindgen_test]
    fn test_describe_http_failure_status() {
        let err = describe_http_failure(502, Some("text/plain".to_string()), "upstream down");
        let status = Reflect::get(&err, &"status".into()).unwrap();
        assert_eq!(status.as_f64(), Some(502.0));
    }
}
