pub mod compositor;
pub mod render;

pub use compositor::{clean_description, SceneCompositor};
pub use render::{load_reference, RenderOrchestrator, STYLE_REQUIREMENTS};
