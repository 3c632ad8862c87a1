// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image description via a best-effort degrade ladder.
//!
//! Stage 1 runs local OCR (color-mode normalized, `tesseract` CLI); stage 2
//! asks a vision-capable Gemini model to describe the image; stage 3 is a
//! fixed placeholder asking the user to describe the image themselves. The
//! caller always gets usable text, never an error.

use crate::services::gemini::GeminiClient;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Returned when neither OCR nor the vision model produced anything.
pub const MANUAL_DESCRIPTION_PLACEHOLDER: &str =
    "Unable to extract text from image. Please describe the image content manually.";

const VISION_PROMPT: &str = "Describe this image in detail. Focus on any text, objects, people, \
     or context that could be fact-checked. Be specific about what you see.";

/// Image description service.
#[derive(Clone)]
pub struct ImageAnalysisService {
    gemini: GeminiClient,
}

impl ImageAnalysisService {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// Produce text describing the image at `path`.
    pub async fn describe(&self, path: &Path) -> String {
        match self.extract_text(path).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(chars = text.trim().len(), "OCR extracted text");
                return text.trim().to_string();
            }
            Ok(_) => tracing::debug!("OCR produced no text"),
            Err(e) => tracing::debug!(error = %e, "OCR unavailable or failed"),
        }

        match self.describe_with_vision(path).await {
            Ok(description) if !description.trim().is_empty() => return description,
            Ok(_) => tracing::warn!("Vision model returned an empty description"),
            Err(e) => tracing::warn!(error = %e, "Vision fallback failed"),
        }

        MANUAL_DESCRIPTION_PLACEHOLDER.to_string()
    }

    /// OCR stage: re-encode to an RGB PNG, then run tesseract if installed.
    async fn extract_text(&self, path: &Path) -> anyhow::Result<String> {
        let source = path.to_path_buf();
        let normalized = tokio::task::spawn_blocking(move || normalize_color_mode(&source))
            .await
            .context("OCR preprocessing task panicked")??;

        let output = Command::new("tesseract")
            .arg(normalized.path())
            .arg("stdout")
            .output()
            .await
            .context("tesseract not available")?;

        if !output.status.success() {
            anyhow::bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Vision stage: hand the raw bytes to Gemini with a description prompt.
    async fn describe_with_vision(&self, path: &Path) -> anyhow::Result<String> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed reading image {}", path.display()))?;

        Ok(self.gemini.describe_image(&data, VISION_PROMPT).await?)
    }
}

/// Decode the uploaded image and re-encode as RGB PNG for OCR. Uploads come
/// in as JPEG/PNG in arbitrary color modes (RGBA, palette, grayscale).
fn normalize_color_mode(path: &PathBuf) -> anyhow::Result<tempfile::NamedTempFile> {
    let decoded = image::open(path).context("failed to decode image")?;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let tmp = tempfile::Builder::new()
        .prefix("verify_ocr_")
        .suffix(".png")
        .tempfile()
        .context("failed creating OCR scratch file")?;
    rgb.save_with_format(tmp.path(), image::ImageFormat::Png)
        .context("failed writing normalized image")?;

    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> tempfile::NamedTempFile {
        let tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255]));
        img.save_with_format(tmp.path(), image::ImageFormat::Png)
            .unwrap();
        tmp
    }

    #[test]
    fn normalize_color_mode_produces_png() {
        let src = tiny_png();
        let normalized = normalize_color_mode(&src.path().to_path_buf()).unwrap();
        assert!(image::open(normalized.path()).is_ok());
    }

    #[tokio::test]
    async fn describe_degrades_to_placeholder() {
        // Vision model is unreachable and a 1x1 image carries no text, so
        // both real stages fail and the ladder bottoms out.
        let gemini = GeminiClient::with_base_url(
            "test-key".to_string(),
            "http://127.0.0.1:9/v1beta".to_string(),
        )
        .unwrap();
        let service = ImageAnalysisService::new(gemini);

        let src = tiny_png();
        let description = service.describe(src.path()).await;

        assert_eq!(description, MANUAL_DESCRIPTION_PLACEHOLDER);
    }
}
