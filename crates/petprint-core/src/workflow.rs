//! Turning a generated design into what the designer displays.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::background::{strip_background, BackgroundRemover, DesignSource};
use crate::config::DesignerConfig;
use crate::crop::CropBox;
use crate::generation::GeneratedDesign;

/// Size and crop of the background-stripped design.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop_box: Option<CropBox>,
}

/// The design shown in the preview, plus how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignResult {
    /// Image placed on the garment: the stripped PNG, or the original
    /// image when stripping failed.
    pub image_url: String,
    /// Image exactly as generated.
    pub original_image_url: String,
    pub background_processed: bool,
    pub processed_metadata: Option<ProcessedMetadata>,
    pub description: String,
    /// Non-blocking message for the user.
    pub notice: Option<String>,
    /// Generator payload.
    pub raw: Value,
}

const BACKGROUND_FAILED_NOTICE: &str =
    "Background removal failed; showing the original design instead.";
const CROP_FAILED_NOTICE: &str =
    "The background was removed but the transparent border could not be trimmed.";

/// Strip the background of a generated design.
///
/// Never fails: when stripping fails the original design is kept and a
/// notice is attached.
pub async fn finalize_design<R: BackgroundRemover>(
    remover: &R,
    generated: GeneratedDesign,
    prompt: &str,
    config: &DesignerConfig,
) -> DesignResult {
    let description = describe(prompt);
    let stripped = strip_background(
        remover,
        DesignSource::DataUrl(&generated.image_url),
        config.alpha_threshold,
    )
    .await;

    match stripped {
        Ok(design) => DesignResult {
            image_url: design.to_data_url(),
            original_image_url: generated.image_url,
            background_processed: true,
            processed_metadata: Some(ProcessedMetadata {
                width: design.width,
                height: design.height,
                crop_box: design.crop_box,
            }),
            description,
            notice: design.crop_failure.as_ref().map(|_| CROP_FAILED_NOTICE.to_string()),
            raw: generated.raw,
        },
        Err(error) => {
            warn!(%error, "background removal failed, keeping generated design");
            DesignResult {
                image_url: generated.image_url.clone(),
                original_image_url: generated.image_url,
                background_processed: false,
                processed_metadata: None,
                description,
                notice: Some(BACKGROUND_FAILED_NOTICE.to_string()),
                raw: generated.raw,
            }
        }
    }
}

fn describe(prompt: &str) -> String {
    match prompt.trim() {
        "" => "Pet T-shirt design".to_string(),
        prompt => format!("Pet T-shirt design: {prompt}"),
    }
}
