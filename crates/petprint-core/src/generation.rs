//! Wire format of the design-generation collaborator.
//!
//! The generator itself (an HTTP call to a multimodal image model) lives
//! outside the core behind [`DesignGenerator`]. What lives here is everything
//! around the call that can be tested without a network: choosing which
//! uploads to send, building the JSON request body, reading the image back
//! out of the response and turning HTTP failures into
//! [`ExternalServiceError`]s.

use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::decode::{to_data_url, DEFAULT_MIME_TYPE};
use crate::error::ExternalServiceError;

/// Instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a T-shirt print design assistant. \
Always return a PNG image on a pure white (#FFFFFF) background.\n\
The subject must have crisp, clean and recognisable edges so it can be cut out afterwards.\n\
Do not add shadows or gradient backgrounds; keep the design centred with the whole subject visible.";

const DEFAULT_FAILURE_MESSAGE: &str = "The model returned no image data";

/// An uploaded reference photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// Declared MIME type; `image/png` is assumed when absent.
    pub mime_type: Option<String>,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        Self { bytes, mime_type }
    }

    pub fn mime_type(&self) -> &str {
        match self.mime_type.as_deref() {
            Some(mime) if !mime.is_empty() => mime,
            _ => DEFAULT_MIME_TYPE,
        }
    }
}

/// Rejections raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Upload at least one pet photo first")]
    NoSourceImages,
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignRequest {
    /// Trimmed user prompt; may be empty.
    pub prompt: String,
    /// Most recent uploads, oldest first.
    pub images: Vec<SourceImage>,
}

impl DesignRequest {
    /// Build a request from the user's prompt and uploads.
    ///
    /// Only the `max_images` most recent uploads are kept.
    pub fn new(
        prompt: &str,
        mut uploads: Vec<SourceImage>,
        max_images: usize,
    ) -> Result<Self, RequestError> {
        let keep = select_request_images(&uploads, max_images).len();
        if keep == 0 {
            return Err(RequestError::NoSourceImages);
        }
        let images = uploads.split_off(uploads.len() - keep);

        Ok(Self {
            prompt: prompt.trim().to_string(),
            images,
        })
    }

    pub fn payload(&self) -> Value {
        build_request_payload(&self.prompt, &self.images)
    }
}

/// The most recent `max_images` uploads, in upload order.
pub fn select_request_images(uploads: &[SourceImage], max_images: usize) -> &[SourceImage] {
    let start = uploads.len().saturating_sub(max_images);
    &uploads[start..]
}

/// Build the JSON request body.
///
/// One `inline_data` part per image, followed by a text part when the
/// trimmed prompt is non-empty.
pub fn build_request_payload(prompt: &str, images: &[SourceImage]) -> Value {
    let mut parts: Vec<Value> = images
        .iter()
        .map(|image| {
            json!({
                "inline_data": {
                    "mime_type": image.mime_type(),
                    "data": general_purpose::STANDARD.encode(&image.bytes),
                }
            })
        })
        .collect();

    let prompt = prompt.trim();
    if !prompt.is_empty() {
        parts.push(json!({ "text": prompt }));
    }

    json!({
        "systemInstruction": {
            "role": "system",
            "parts": [{ "text": SYSTEM_PROMPT }],
        },
        "contents": [{
            "role": "user",
            "parts": parts,
        }],
    })
}

/// A generated design as returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDesign {
    /// `data:` URL of the generated image
    pub image_url: String,
    /// Full response payload, kept for diagnostics
    pub raw: Value,
}

/// Extract the generated image from a successful response.
///
/// Both `inline_data` and `inlineData` spellings are accepted.
///
/// # Errors
///
/// Without image data, fails with the payload's `error.message` (or a
/// default message), carrying the payload and status.
pub fn parse_design_response(
    status: u16,
    payload: Value,
) -> Result<GeneratedDesign, ExternalServiceError> {
    let image_url = payload
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .and_then(|parts| parts.iter().find_map(inline_image));

    match image_url {
        Some(image_url) => {
            debug!(status, "model returned image data");
            Ok(GeneratedDesign {
                image_url,
                raw: payload,
            })
        }
        None => {
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                .to_string();
            warn!(status, %message, "model response carried no image");
            Err(ExternalServiceError::new(message)
                .with_payload(payload)
                .with_status(status))
        }
    }
}

fn inline_image(part: &Value) -> Option<String> {
    let inline = part.get("inline_data").or_else(|| part.get("inlineData"))?;
    let data = inline.get("data").and_then(Value::as_str)?;
    if data.is_empty() {
        return None;
    }
    let mime = inline
        .get("mime_type")
        .or_else(|| inline.get("mimeType"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MIME_TYPE);

    Some(format!("data:{mime};base64,{data}"))
}

/// Describe a non-2xx response from the model endpoint.
///
/// JSON bodies contribute their `error.message`; other bodies contribute
/// their text, kept in the payload as `{ "raw": text }`.
pub fn describe_http_failure(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> ExternalServiceError {
    let base = format!("Model request failed: {status}");
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));

    let error = if is_json {
        match serde_json::from_str::<Value>(body) {
            Ok(payload) => {
                let message = match payload.pointer("/error/message").and_then(Value::as_str) {
                    Some(remote) => format!("{base} {remote}"),
                    None => base,
                };
                ExternalServiceError::new(message).with_payload(payload)
            }
            Err(e) => {
                warn!(status, error = %e, "failed to parse model error response");
                ExternalServiceError::new(base)
            }
        }
    } else if body.is_empty() {
        ExternalServiceError::new(base)
    } else {
        ExternalServiceError::new(format!("{base} {body}")).with_payload(json!({ "raw": body }))
    };

    error.with_status(status)
}

/// Error for a request that never produced a response.
pub fn network_failure() -> ExternalServiceError {
    ExternalServiceError::new("Model request failed: network error")
}

/// Produces a design image from a request.
///
/// Futures are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait DesignGenerator {
    async fn generate(&self, request: &DesignRequest)
        -> Result<GeneratedDesign, ExternalServiceError>;
}

/// Encode raw image bytes as a generated design, e.g. for a canned or
/// locally produced image.
pub fn design_from_bytes(mime_type: &str, bytes: &[u8]) -> GeneratedDesign {
    GeneratedDesign {
        image_url: to_data_url(mime_type, bytes),
        raw: Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(tag: u8) -> SourceImage {
        SourceImage::new(vec![tag; 3], Some("image/jpeg".to_string()))
    }

    #[test]
    fn test_select_keeps_latest_three() {
        let uploads: Vec<_> = (1..=5).map(upload).collect();
        let selected = select_request_images(&uploads, 3);
        let tags: Vec<u8> = selected.iter().map(|i| i.bytes[0]).collect();
        assert_eq!(tags, vec![3, 4, 5]);
    }

    #[test]
    fn test_select_fewer_than_max() {
        let uploads = vec![upload(1)];
        assert_eq!(select_request_images(&uploads, 3).len(), 1);
        assert!(select_request_images(&[], 3).is_empty());
    }

    #[test]
    fn test_request_requires_image() {
        assert_eq!(
            DesignRequest::new("a cat", vec![], 3),
            Err(RequestError::NoSourceImages)
        );
        assert_eq!(
            DesignRequest::new("a cat", vec![upload(1)], 0),
            Err(RequestError::NoSourceImages)
        );
    }

    #[test]
    fn test_request_trims_prompt_and_keeps_recent() {
        let uploads: Vec<_> = (1..=4).map(upload).collect();
        let request = DesignRequest::new("  watercolor corgi \n", uploads, 3).unwrap();
        assert_eq!(request.prompt, "watercolor corgi");
        assert_eq!(request.images.len(), 3);
        assert_eq!(request.images[0].bytes[0], 2);
    }

    #[test]
    fn test_payload_layout() {
        let images = vec![
            SourceImage::new(b"abc".to_vec(), Some("image/jpeg".to_string())),
            SourceImage::new(b"xyz".to_vec(), None),
        ];

        let payload = build_request_payload("  pop art  ", &images);

        assert_eq!(payload["systemInstruction"]["role"], "system");
        assert_eq!(payload["systemInstruction"]["parts"][0]["text"], SYSTEM_PROMPT);
        assert_eq!(payload["contents"][0]["role"], "user");

        let parts = payload["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[0]["inline_data"]["data"], "YWJj");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[2]["text"], "pop art");
    }

    #[test]
    fn test_payload_omits_blank_prompt() {
        let payload = build_request_payload("   ", &[upload(1)]);
        let parts = payload["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].get("text").is_none());
    }

    #[test]
    fn test_parse_snake_case_inline_data() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your design" },
                    { "inline_data": { "mime_type": "image/webp", "data": "AAAA" } }
                ]}
            }]
        });

        let design = parse_design_response(200, payload.clone()).unwrap();
        assert_eq!(design.image_url, "data:image/webp;base64,AAAA");
        assert_eq!(design.raw, payload);
    }

    #[test]
    fn test_parse_camel_case_defaults_mime() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "data": "QUJD" } }] }
            }]
        });

        let design = parse_design_response(200, payload).unwrap();
        assert_eq!(design.image_url, "data:image/png;base64,QUJD");
    }

    #[test]
    fn test_parse_skips_empty_data() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "" } },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "Zm9v" } }
                ]}
            }]
        });

        let design = parse_design_response(200, payload).unwrap();
        assert_eq!(design.image_url, "data:image/jpeg;base64,Zm9v");
    }

    #[test]
    fn test_parse_without_image_uses_remote_message() {
        let payload = json!({ "error": { "message": "quota exceeded" } });

        let err = parse_design_response(200, payload.clone()).unwrap_err();
        assert_eq!(err.message, "quota exceeded");
        assert_eq!(err.payload, Some(payload));
        assert_eq!(err.status, Some(200));
    }

    #[test]
    fn test_parse_without_image_default_message() {
        let payload = json!({ "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }] });
        let err = parse_design_response(200, payload).unwrap_err();
        assert_eq!(err.message, DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_http_failure_json() {
        let err = describe_http_failure(
            429,
            Some("application/json; charset=UTF-8"),
            r#"{"error":{"code":429,"message":"Resource exhausted"}}"#,
        );
        assert_eq!(err.message, "Model request failed: 429 Resource exhausted");
        assert_eq!(err.status, Some(429));
        assert_eq!(err.payload.unwrap()["error"]["code"], 429);
    }

    #[test]
    fn test_http_failure_malformed_json() {
        let err = describe_http_failure(500, Some("application/json"), "{not json");
        assert_eq!(err.message, "Model request failed: 500");
        assert!(err.payload.is_none());
    }

    #[test]
    fn test_http_failure_text() {
        let err = describe_http_failure(502, Some("text/html"), "Bad Gateway");
        assert_eq!(err.message, "Model request failed: 502 Bad Gateway");
        assert_eq!(err.payload, Some(json!({ "raw": "Bad Gateway" })));

        let empty = describe_http_failure(503, None, "");
        assert_eq!(empty.message, "Model request failed: 503");
        assert!(empty.payload.is_none());
    }

    #[test]
    fn test_network_failure_has_no_status() {
        let err = network_failure();
        assert_eq!(err.message, "Model request failed: network error");
        assert!(err.status.is_none());
        assert!(err.payload.is_none());
    }

    #[test]
    fn test_design_from_bytes() {
        let design = design_from_bytes("image/png", b"abc");
        assert_eq!(design.image_url, "data:image/png;base64,YWJj");
        assert_eq!(design.raw, Value::Null);
    }

    #[test]
    fn test_generator_collaborator() {
        struct Canned;

        impl DesignGenerator for Canned {
            async fn generate(
                &self,
                request: &DesignRequest,
            ) -> Result<GeneratedDesign, ExternalServiceError> {
                Ok(design_from_bytes("image/png", &request.images[0].bytes))
            }
        }

        let request = DesignRequest::new("", vec![upload(7)], 3).unwrap();
        let design = pollster::block_on(Canned.generate(&request)).unwrap();
        assert!(design.image_url.starts_with("data:image/png;base64,"));
    }
}
