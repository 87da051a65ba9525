use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ServiceError;
use crate::services::{ImageGeneration, ImageRef, ImageRequest};

pub const NEGATIVE_PROMPT: &str = "2D, flat, cartoon, simple, minimalist, line drawing, sketch, children's book illustration, \
background elements, scene elements, environment, setting, context, anything except the character and white background";

/// Image generation client for the Together API.
#[derive(Clone)]
pub struct ImageService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    steps: u32,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    steps: u32,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

#[derive(Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: Option<String>,
    b64_json: Option<String>,
}

impl ImageService {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>, steps: u32) -> Self {
        Self {
            client: Client::builder().build().unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            steps,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.together_base_url.clone(),
            config.together_api_key.clone(),
            config.image_model.clone(),
            config.image_steps,
        )
    }

    pub async fn create(&self, request: &ImageRequest) -> Result<ImageRef, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredential { service: "Together" })?;

        let body = GenerationRequest {
            model: &self.model,
            prompt: &request.prompt,
            steps: self.steps,
            n: 1,
            negative_prompt: request.negative_prompt.as_deref(),
            image_url: request.reference.as_ref().map(ImageRef::as_str),
        };

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Image API error: {}", text);
            return Err(ServiceError::Transport(format!("image request failed with status {}: {}", status, text)));
        }

        let resp_json: GenerationResponse = response.json().await?;
        let first = resp_json
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::MalformedResponse("empty data array".to_string()))?;

        let image = match (first.url, first.b64_json) {
            (Some(url), _) => ImageRef::url(url),
            (None, Some(b64)) => ImageRef::inline("image/png", &b64),
            (None, None) => return Err(ServiceError::MalformedResponse("no image data in response".to_string())),
        };

        debug!("Image generated: {}", image);
        Ok(image)
    }
}

impl ImageGeneration for ImageService {
    fn generate(&self, request: ImageRequest) -> BoxFuture<'_, Result<ImageRef, ServiceError>> {
        Box::pin(async move { self.create(&request).await })
    }
}
