use crate::error::Rejection;
use crate::pool::{ActionPhrase, PhraseId};
use crate::services::ImageRef;

#[derive(Debug, Clone)]
pub enum Event {
    /// Presentation layer signals (drops, typed actions).
    Input(InputEvent),
    /// Debounce window lapsed for the submission with this sequence number.
    BatchDue(u64),
    PhrasesGenerated(Vec<ActionPhrase>),
    ReplenishFailed,
    SceneRendered {
        description: String,
        image: Option<ImageRef>,
    },
    RewriteFinished {
        original: String,
        outcome: Result<String, Rejection>,
    },
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct InputEvent {
    pub source: String,
    pub content: InputContent,
}

#[derive(Debug, Clone)]
pub enum InputContent {
    /// A phrase dragged onto the stage.
    Drop(PhraseId),
    /// A typed action for the custom tray.
    Custom(String),
    /// Ask the model to validate and tidy a typed action.
    Rewrite(String),
}

impl InputEvent {
    pub fn drop(source: &str, id: PhraseId) -> Self {
        Self {
            source: source.to_string(),
            content: InputContent::Drop(id),
        }
    }

    pub fn custom(source: &str, text: &str) -> Self {
        Self {
            source: source.to_string(),
            content: InputContent::Custom(text.to_string()),
        }
    }

    pub fn rewrite(source: &str, text: &str) -> Self {
        Self {
            source: source.to_string(),
            content: InputContent::Rewrite(text.to_string()),
        }
    }
}

/// What the presentation layer should refresh or show after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Banner(String),
    SlotsChanged,
    CustomAdded(PhraseId),
    Rejected { text: String, reason: String },
    Dispatched(Vec<String>),
    SceneUpdated,
    /// A render came back empty; the previous image stays up.
    RenderSkipped,
    Rewritten {
        original: String,
        outcome: Result<String, Rejection>,
    },
}
