pub mod client;

pub use client::{ImageService, NEGATIVE_PROMPT};
