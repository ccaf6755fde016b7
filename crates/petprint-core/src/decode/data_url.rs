//! `data:` URL parsing.
//!
//! The generation collaborator hands designs back as self-describing
//! base64 data URLs (`data:image/png;base64,...`). These helpers split such a
//! URL into its MIME type and raw bytes so the rest of the core can work
//! on bytes.

use base64::{engine::general_purpose, Engine as _};

use super::DecodeError;

/// MIME type assumed when a data URL omits one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// MIME type from the URL header, e.g. `image/png`.
    pub mime_type: String,
    /// Decoded payload bytes.
    pub bytes: Vec<u8>,
}

/// Parse a base64 `data:` URL.
///
/// Only base64 payloads are accepted; percent-encoded text payloads never
/// carry image data in this pipeline.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDataUrl` when the scheme, header or base64
/// payload is malformed.
pub fn parse_data_url(url: &str) -> Result<DataUrl, DecodeError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| DecodeError::InvalidDataUrl("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidDataUrl("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let mime_type = match params.next() {
        Some(mime) if !mime.is_empty() => mime.to_ascii_lowercase(),
        _ => DEFAULT_MIME_TYPE.to_string(),
    };
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(DecodeError::InvalidDataUrl(
            "payload is not base64 encoded".to_string(),
        ));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::InvalidDataUrl(e.to_string()))?;

    Ok(DataUrl { mime_type, bytes })
}

/// Format bytes as a base64 `data:` URL.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}
