//! Background removal followed by border trimming.
//!
//! The segmentation itself is an external collaborator behind the
//! [`BackgroundRemover`] trait. This module resolves the design source,
//! calls the collaborator once and trims the transparent margin from its
//! output.

use thiserror::Error;
use tracing::debug;

use crate::crop::{crop_encoded, ProcessedDesign};
use crate::decode::{parse_data_url, DecodeError};
use crate::error::ExternalServiceError;

/// Output encoding requested from the remover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
        }
    }
}

/// Produces a transparent-background version of an image.
///
/// Implementations return the encoded result in the requested format.
/// Futures are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait BackgroundRemover {
    async fn remove_background(
        &self,
        source: &[u8],
        format: OutputFormat,
    ) -> Result<Vec<u8>, ExternalServiceError>;
}

/// Where the design to strip comes from.
#[derive(Debug, Clone, Copy)]
pub enum DesignSource<'a> {
    /// Encoded image bytes
    Bytes(&'a [u8]),
    /// A base64 `data:` URL, as produced by the generator
    DataUrl(&'a str),
}

/// Errors that abort background stripping.
///
/// Crop failures are not in here: they fall back to the uncropped bytes
/// and are reported through [`ProcessedDesign::crop_failure`].
#[derive(Debug, Error)]
pub enum StripError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    External(#[from] ExternalServiceError),
}

/// Remove the background from `source` and trim the transparent margin.
///
/// The remover is invoked exactly once; its failure is returned unchanged.
pub async fn strip_background<R: BackgroundRemover>(
    remover: &R,
    source: DesignSource<'_>,
    alpha_threshold: u8,
) -> Result<ProcessedDesign, StripError> {
    let resolved;
    let bytes = match source {
        DesignSource::Bytes(bytes) => bytes,
        DesignSource::DataUrl(url) => {
            resolved = parse_data_url(url)?;
            resolved.bytes.as_slice()
        }
    };

    let stripped = remover.remove_background(bytes, OutputFormat::Png).await?;
    debug!(input = bytes.len(), output = stripped.len(), "background removed");

    Ok(crop_encoded(stripped, alpha_threshold))
}
