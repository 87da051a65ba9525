//! Capability contracts for the remote collaborators, plus HTTP clients.
//!
//! Components only ever hold `Arc<dyn ...>` handles, so tests swap in
//! scripted fakes and the binary wires the real clients.

pub mod background;
pub mod image;
pub mod llm;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::ServiceError;

/// A single system+user completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub trait TextGeneration: Send + Sync {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, ServiceError>>;
}

/// Reference to a rendered image: either a remote URL or a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Wraps an already base64-encoded payload.
    pub fn inline(mime: &str, base64_payload: &str) -> Self {
        Self(format!("data:{};base64,{}", mime, base64_payload))
    }

    pub fn is_inline(&self) -> bool {
        self.0.starts_with("data:")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inline() {
            // Inline payloads are huge; show only the header.
            let header = self.0.split(',').next().unwrap_or_default();
            write!(f, "{},<{} bytes>", header, self.0.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    /// Keeps the character consistent across renders.
    pub reference: Option<ImageRef>,
}

pub trait ImageGeneration: Send + Sync {
    fn generate(&self, request: ImageRequest) -> BoxFuture<'_, Result<ImageRef, ServiceError>>;
}

pub trait BackgroundRemoval: Send + Sync {
    fn remove_background(&self, image: ImageRef) -> BoxFuture<'_, Result<ImageRef, ServiceError>>;
}

/// The injected collaborators, constructed once and shared by the components.
#[derive(Clone)]
pub struct Services {
    pub text: Arc<dyn TextGeneration>,
    pub images: Arc<dyn ImageGeneration>,
    pub background: Arc<dyn BackgroundRemoval>,
}
