use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhraseId(pub Uuid);

impl PhraseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhraseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhraseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Generated,
    Custom,
}

/// One short imperative modification, e.g. "Paint him neon pink!".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPhrase {
    pub id: PhraseId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub origin: Origin,
    /// Flips to true exactly once, when dropped onto the stage.
    pub used: bool,
    /// Set when promoted from the backlog into a slot, so the UI can fade it in.
    pub fresh: bool,
}

static HIM_RE: OnceLock<Regex> = OnceLock::new();

impl ActionPhrase {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            id: PhraseId::new(),
            text: text.into(),
            created_at: Utc::now(),
            origin,
            used: false,
            fresh: false,
        }
    }

    pub fn generated(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Generated)
    }

    pub fn custom(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Custom)
    }

    /// Text as shown on a block: "him" becomes the character's name.
    pub fn display_text(&self, character_name: &str) -> String {
        let re = HIM_RE.get_or_init(|| Regex::new(r"(?i)\bhim\b").unwrap());
        re.replace_all(&self.text, character_name).into_owned()
    }
}

/// One visible position. Empty only if the backlog was dry when it was vacated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub index: usize,
    pub phrase: Option<ActionPhrase>,
}

impl Slot {
    pub fn empty(index: usize) -> Self {
        Self { index, phrase: None }
    }

    pub fn is_empty(&self) -> bool {
        self.phrase.is_none()
    }
}

/// What happened when a phrase was dropped onto the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Consumed {
    pub text: String,
    pub origin: Origin,
    /// Slot that was vacated (generated phrases only).
    pub slot: Option<usize>,
    /// Backlog phrase promoted into the vacated slot, if any.
    pub promoted: Option<PhraseId>,
}
