pub mod batcher;
pub mod config;
pub mod console;
pub mod error;
pub mod kernel;
pub mod pool;
pub mod scene;
pub mod services;
pub mod text;

pub use kernel::reactor::Reactor;
