pub mod batcher;
pub mod timer;

pub use batcher::ActionBatcher;
pub use timer::DebounceTimer;
