use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::services::image::NEGATIVE_PROMPT;
use crate::services::{BackgroundRemoval, ImageGeneration, ImageRef, ImageRequest};

pub const STYLE_REQUIREMENTS: &str = "Style requirements:
- Maintain the exact same character model and core features from the reference image
- Only modify the aspects mentioned in the actions
- Keep the same high-quality 3D render style with Pixar-like lighting
- White background
- Full body shot, centered composition
- Cinematic lighting
- Show clear emotional reactions and expressions
- Use slapstick cartoon physics for the actions
- Preserve the original character's proportions and core design";

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}

/// Reads the base character image and inlines it as a reference.
/// A missing or unrecognised file means rendering runs without one.
pub async fn load_reference(path: &Path) -> Option<ImageRef> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Base image {} unavailable: {}", path.display(), e);
            return None;
        }
    };

    let mime = image::guess_format(&bytes).ok().and_then(mime_for);
    match mime {
        Some(mime) => Some(ImageRef::inline(mime, &STANDARD.encode(&bytes))),
        None => {
            warn!("Base image {} is not a supported image format", path.display());
            None
        }
    }
}

/// Renders a composed scene description and strips the background.
#[derive(Clone)]
pub struct RenderOrchestrator {
    images: Arc<dyn ImageGeneration>,
    background: Arc<dyn BackgroundRemoval>,
    reference: Option<ImageRef>,
}

impl RenderOrchestrator {
    pub fn new(images: Arc<dyn ImageGeneration>, background: Arc<dyn BackgroundRemoval>) -> Self {
        Self {
            images,
            background,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: Option<ImageRef>) -> Self {
        self.reference = reference;
        self
    }

    pub fn build_prompt(description: &str) -> String {
        format!("{}\n\n{}", description, STYLE_REQUIREMENTS)
    }

    /// `None` means "no visual update this cycle"; the caller keeps the old image.
    pub async fn render(&self, description: &str) -> Option<ImageRef> {
        let request = ImageRequest {
            prompt: Self::build_prompt(description),
            negative_prompt: Some(NEGATIVE_PROMPT.to_string()),
            reference: self.reference.clone(),
        };

        info!("Starting image generation for prompt: {}", description);
        let image = match self.images.generate(request).await {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to generate image: {}", e);
                return None;
            }
        };

        match self.background.remove_background(image.clone()).await {
            Ok(cutout) => Some(cutout),
            Err(e) => {
                warn!("Background removal failed, returning original image: {}", e);
                Some(image)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_appends_style_block() {
        let prompt = RenderOrchestrator::build_prompt("A cheerful 3D animated elephant dances.");
        assert!(prompt.starts_with("A cheerful 3D animated elephant dances.\n\nStyle requirements:"));
        assert!(prompt.contains("White background"));
    }

    #[tokio::test]
    async fn missing_reference_file_is_none() {
        assert!(load_reference(Path::new("/nonexistent/fanto-base.png")).await.is_none());
    }
}
