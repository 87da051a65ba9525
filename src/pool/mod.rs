pub mod generation;
pub mod manager;
pub mod types;

pub use generation::{parse_action_lines, ActionGenerator};
pub use manager::ActionPool;
pub use types::*;
