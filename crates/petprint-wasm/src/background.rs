//! Background stripping WASM bindings.
//!
//! The segmentation model runs in JavaScript. It is handed to these
//! bindings as a function `(bytes: Uint8Array, mimeType: string) =>
//! Promise<Uint8Array | ArrayBuffer>`; the bindings call it once and trim
//! the transparent margin from what it returns.
//!
//! # Example
//!
//! ```typescript
//! import { removeBackground } from '@imgly/background-removal';
//! import { finalize_design } from '@petprint/wasm';
//!
//! const remover = async (bytes, mimeType) => {
//!   const blob = await removeBackground(new Blob([bytes]), { output: { format: mimeType } });
//!   return new Uint8Array(await blob.arrayBuffer());
//! };
//!
//! const result = await finalize_design(remover, generated.imageUrl, generated.raw, prompt);
//! if (result.notice) showToast(result.notice);
//! ```

use crate::crop::JsProcessedDesign;
use crate::types::{config_from_js, js_error, warn_console};
use js_sys::{Function, Promise, Uint8Array};
use petprint_core::background::{self, BackgroundRemover, DesignSource, OutputFormat};
use petprint_core::config::DEFAULT_ALPHA_THRESHOLD;
use petprint_core::error::ExternalServiceError;
use petprint_core::generation::GeneratedDesign;
use petprint_core::workflow;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// A JavaScript background-removal function.
struct JsRemover {
    function: Function,
}

impl BackgroundRemover for JsRemover {
    async fn remove_background(
        &self,
        source: &[u8],
        format: OutputFormat,
    ) -> Result<Vec<u8>, ExternalServiceError> {
        let input = Uint8Array::from(source);
        let returned = self
            .function
            .call2(&JsValue::NULL, &input, &JsValue::from_str(format.mime_type()))
            .map_err(external_error)?;

        let output = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(external_error)?;

        if output.is_instance_of::<Uint8Array>() || output.is_instance_of::<js_sys::ArrayBuffer>() {
            Ok(Uint8Array::new(&output).to_vec())
        } else {
            Err(ExternalServiceError::new(
                "Background remover did not return image bytes",
            ))
        }
    }
}

fn external_error(value: JsValue) -> ExternalServiceError {
    if let Some(message) = value.as_string() {
        return ExternalServiceError::new(message);
    }
    match value.dyn_into::<js_sys::Error>() {
        Ok(error) => ExternalServiceError::new(String::from(error.message())),
        Err(_) => ExternalServiceError::new("Background removal failed"),
    }
}

/// Remove the background of an image and trim its transparent margin.
///
/// `source` is either encoded image bytes (`Uint8Array`) or a base64
/// `data:` URL string. Rejects when the source cannot be read or the
/// remover fails; a failed trim resolves with the untrimmed PNG and
/// `cropFailure` set.
#[wasm_bindgen]
pub async fn strip_background(
    remover: Function,
    source: JsValue,
    alpha_threshold: Option<u8>,
) -> Result<JsProcessedDesign, JsValue> {
    let remover = JsRemover { function: remover };
    let threshold = alpha_threshold.unwrap_or(DEFAULT_ALPHA_THRESHOLD);

    let url = source.as_string();
    let bytes;
    let source = match url.as_deref() {
        Some(url) => DesignSource::DataUrl(url),
        None => {
            bytes = Uint8Array::new(&source).to_vec();
            DesignSource::Bytes(&bytes)
        }
    };

    let design = background::strip_background(&remover, source, threshold)
        .await
        .map_err(js_error)?;

    if let Some(failure) = &design.crop_failure {
        warn_console(&format!("Trimming transparent borders failed: {failure}"));
    }
    Ok(JsProcessedDesign::from_processed(design))
}

/// Strip the background of a generated design and describe the result.
///
/// Resolves with an object holding `imageUrl`, `originalImageUrl`,
/// `backgroundProcessed`, `processedMetadata`, `description`, `notice` and
/// `raw`. Stripping failures never reject; only a malformed `raw` or
/// `config` argument does.
///
/// `config` is an optional partial config object; its `alpha_threshold`
/// drives the trim.
#[wasm_bindgen]
pub async fn finalize_design(
    remover: Function,
    image_url: String,
    raw: JsValue,
    prompt: String,
    config: JsValue,
) -> Result<JsValue, JsValue> {
    let config = config_from_js(config)?;
    let remover = JsRemover { function: remover };
    let raw = if raw.is_undefined() || raw.is_null() {
        serde_json::Value::Null
    } else {
        serde_wasm_bindgen::from_value(raw).map_err(js_error)?
    };

    let result = workflow::finalize_design(
        &remover,
        GeneratedDesign { image_url, raw },
        &prompt,
        &config,
    )
    .await;

    if let Some(notice) = &result.notice {
        warn_console(notice);
    }
    result
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}
