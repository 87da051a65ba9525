#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use fanto::error::ServiceError;
use fanto::services::{
    BackgroundRemoval, CompletionRequest, ImageGeneration, ImageRef, ImageRequest, Services, TextGeneration,
};
use futures::future::BoxFuture;

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, ServiceError> + Send + Sync>;

/// Text service that answers through a closure and records every request.
pub struct FakeText {
    respond: Responder,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeText {
    pub fn new<F>(respond: F) -> Arc<Self>
    where
        F: Fn(&CompletionRequest) -> Result<String, ServiceError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Always replies with the same text.
    pub fn fixed(reply: &str) -> Arc<Self> {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_| Err(ServiceError::Transport("connection refused".to_string())))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, i: usize) -> CompletionRequest {
        self.requests.lock().unwrap()[i].clone()
    }
}

impl TextGeneration for FakeText {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, ServiceError>> {
        let result = (self.respond)(&request);
        self.requests.lock().unwrap().push(request);
        Box::pin(async move { result })
    }
}

pub fn is_batch_request(request: &CompletionRequest) -> bool {
    request.system.starts_with("Generate a list of unique, funny slapstick commands")
}

pub fn is_scene_request(request: &CompletionRequest) -> bool {
    request.system.starts_with("You are a scene description generator")
}

pub struct FakeImages {
    result: Result<ImageRef, ServiceError>,
    pub requests: Mutex<Vec<ImageRequest>>,
}

impl FakeImages {
    pub fn returning(url: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(ImageRef::url(url)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Err(ServiceError::Transport("status 500".to_string())),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl ImageGeneration for FakeImages {
    fn generate(&self, request: ImageRequest) -> BoxFuture<'_, Result<ImageRef, ServiceError>> {
        self.requests.lock().unwrap().push(request);
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

pub struct FakeBackground {
    fail: bool,
    pub seen: Mutex<Vec<ImageRef>>,
}

impl FakeBackground {
    pub fn working() -> Arc<Self> {
        Arc::new(Self { fail: false, seen: Mutex::new(Vec::new()) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, seen: Mutex::new(Vec::new()) })
    }
}

impl BackgroundRemoval for FakeBackground {
    fn remove_background(&self, image: ImageRef) -> BoxFuture<'_, Result<ImageRef, ServiceError>> {
        self.seen.lock().unwrap().push(image.clone());
        let result = if self.fail {
            Err(ServiceError::MalformedResponse("No image URL in background removal response".to_string()))
        } else {
            Ok(ImageRef::url(format!("{}#nobg", image.as_str())))
        };
        Box::pin(async move { result })
    }
}

pub fn services(text: Arc<FakeText>, images: Arc<FakeImages>, background: Arc<FakeBackground>) -> Services {
    Services { text, images, background }
}

pub const TEN_ACTIONS: &str = "1. Paint him neon pink!
2. Feed him rotten eggs!
3. Cover him in bug slime!
4. Unleash skunks around him!
5. Make him slip on poop!
6. Turn him into toilet paper!
7. Make him fart rainbows!
8. Launch him into orbit!
9. Tickle his giant ears!
10. Dunk him in custard!";
