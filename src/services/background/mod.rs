pub mod client;

pub use client::BackgroundService;
