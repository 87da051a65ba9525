use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ServiceError;
use crate::services::{BackgroundRemoval, ImageRef};

const REMOVE_ENDPOINT: &str = "fal-ai/bria/background/remove";

/// Background removal through fal.ai's synchronous run endpoint.
#[derive(Clone)]
pub struct BackgroundService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    image_url: &'a str,
}

#[derive(Deserialize)]
struct RemoveResponse {
    image: Option<RemovedImage>,
}

#[derive(Deserialize)]
struct RemovedImage {
    url: Option<String>,
}

impl BackgroundService {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder().build().unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.fal_base_url.clone(), config.fal_api_key.clone())
    }

    pub async fn remove(&self, image: &ImageRef) -> Result<ImageRef, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredential { service: "fal" })?;

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, REMOVE_ENDPOINT))
            .header(reqwest::header::AUTHORIZATION, format!("Key {}", api_key))
            .json(&RemoveRequest { image_url: image.as_str() })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Transport(format!("background removal failed with status {}: {}", status, text)));
        }

        let resp_json: RemoveResponse = response.json().await?;
        resp_json
            .image
            .and_then(|img| img.url)
            .map(ImageRef::url)
            .ok_or_else(|| ServiceError::MalformedResponse("No image URL in background removal response".to_string()))
    }
}

impl BackgroundRemoval for BackgroundService {
    fn remove_background(&self, image: ImageRef) -> BoxFuture<'_, Result<ImageRef, ServiceError>> {
        Box::pin(async move { self.remove(&image).await })
    }
}
