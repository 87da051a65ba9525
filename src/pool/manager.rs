use regex::Regex;
use std::collections::{BTreeSet, VecDeque};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::generation::ActionGenerator;
use super::types::{ActionPhrase, Consumed, Origin, PhraseId, Slot};
use crate::error::Rejection;
use crate::text::{judge, normalize, Uniqueness};

static PRONOUN_RE: OnceLock<Regex> = OnceLock::new();

fn mentions_subject(text: &str) -> bool {
    PRONOUN_RE
        .get_or_init(|| Regex::new(r"(?i)\b(him|his|he)\b").unwrap())
        .is_match(text)
}

/// Owns the visible slots, the off-screen backlog, the custom tray and the
/// set of every phrase text ever consumed.
#[derive(Debug, Clone)]
pub struct ActionPool {
    slots: Vec<Slot>,
    backlog: VecDeque<ActionPhrase>,
    custom: Vec<ActionPhrase>,
    used: BTreeSet<String>,
    min_backlog: usize,
}

impl ActionPool {
    /// Empty slots and an empty backlog.
    pub fn new(slot_count: usize, min_backlog: usize) -> Self {
        Self {
            slots: (0..slot_count).map(Slot::empty).collect(),
            backlog: VecDeque::new(),
            custom: Vec::new(),
            used: BTreeSet::new(),
            min_backlog,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn backlog(&self) -> &VecDeque<ActionPhrase> {
        &self.backlog
    }

    pub fn custom(&self) -> &[ActionPhrase] {
        &self.custom
    }

    pub fn used(&self) -> &BTreeSet<String> {
        &self.used
    }

    /// Unconsumed phrases on screen: slot occupants, then the custom tray.
    pub fn visible(&self) -> impl Iterator<Item = &ActionPhrase> {
        self.slots
            .iter()
            .filter_map(|slot| slot.phrase.as_ref())
            .chain(self.custom.iter())
    }

    fn known_texts(&self) -> impl Iterator<Item = &str> {
        self.visible()
            .chain(self.backlog.iter())
            .map(|p| p.text.as_str())
            .chain(self.used.iter().map(String::as_str))
    }

    /// Everything the generator must steer clear of.
    pub fn exclusions(&self) -> Vec<String> {
        self.known_texts().map(str::to_string).collect()
    }

    /// Content and uniqueness rules for a candidate phrase.
    pub fn validate(&self, text: &str, is_custom: bool) -> Result<(), Rejection> {
        if text.trim().len() < 2 {
            return Err(Rejection::new("Type something mean..."));
        }

        if !is_custom && !mentions_subject(text) {
            return Err(Rejection::new("Action must include him/his/he"));
        }

        match judge(text, self.known_texts()) {
            Uniqueness::Unique(parts) => {
                debug!("Action is unique: {} ({:?})", text, parts);
                Ok(())
            }
            Uniqueness::Ambiguous => {
                debug!("No verb or object found: {}", text);
                Err(Rejection::new("Action too similar to existing ones"))
            }
            Uniqueness::SimilarTo(existing) => {
                debug!("Action similar to existing block: {} ~ {}", text, existing);
                Err(Rejection::new("Action too similar to existing ones"))
            }
        }
    }

    /// Places one generated phrase: leftmost empty slot, else the backlog.
    /// Returns the slot index when it landed on screen.
    pub fn place(&mut self, phrase: ActionPhrase) -> Result<Option<usize>, Rejection> {
        self.validate(&phrase.text, phrase.origin == Origin::Custom)?;

        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_empty()) {
            slot.phrase = Some(phrase);
            Ok(Some(slot.index))
        } else {
            self.backlog.push_back(phrase);
            Ok(None)
        }
    }

    /// Appends generated phrases to the backlog, skipping near-duplicates.
    /// Returns how many were kept.
    pub fn absorb(&mut self, phrases: Vec<ActionPhrase>) -> usize {
        let mut kept = 0;
        for phrase in phrases {
            match self.validate(&phrase.text, false) {
                Ok(()) => {
                    self.backlog.push_back(phrase);
                    kept += 1;
                }
                Err(reason) => debug!("Dropped generated phrase '{}': {}", phrase.text, reason),
            }
        }
        kept
    }

    pub fn needs_replenish(&self) -> bool {
        self.backlog.len() < self.min_backlog
    }

    /// Exclusion context for a replenishment fetch, if one is due.
    pub fn replenishment_request(&self) -> Option<Vec<String>> {
        self.needs_replenish().then(|| self.exclusions())
    }

    /// Drops a phrase onto the stage. Unknown or already-consumed ids are ignored.
    pub fn consume(&mut self, id: PhraseId) -> Option<Consumed> {
        if let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.phrase.as_ref().is_some_and(|p| p.id == id))
        {
            let mut phrase = self.slots[index].phrase.take()?;
            phrase.used = true;
            self.used.insert(phrase.text.clone());

            let promoted = self.backlog.pop_front().map(|mut next| {
                next.fresh = true;
                let next_id = next.id;
                self.slots[index].phrase = Some(next);
                next_id
            });

            if promoted.is_none() {
                info!("Backlog empty, slot {} left open", index);
            }

            return Some(Consumed {
                text: phrase.text,
                origin: Origin::Generated,
                slot: Some(index),
                promoted,
            });
        }

        if let Some(pos) = self.custom.iter().position(|p| p.id == id) {
            let mut phrase = self.custom.remove(pos);
            phrase.used = true;
            self.used.insert(phrase.text.clone());
            return Some(Consumed {
                text: phrase.text,
                origin: Origin::Custom,
                slot: None,
                promoted: None,
            });
        }

        warn!("Drop of unknown phrase {}", id);
        None
    }

    /// Adds a typed phrase to the custom tray.
    pub fn add_custom(&mut self, raw: &str) -> Result<PhraseId, Rejection> {
        let text = normalize(raw);
        if text.is_empty() {
            return Err(Rejection::new("Type something mean..."));
        }
        self.validate(&text, true)?;

        let phrase = ActionPhrase::custom(text);
        let id = phrase.id;
        self.custom.push(phrase);
        Ok(id)
    }

    /// Startup fill: one batch with no exclusions, slots left to right, the
    /// rest to the backlog. `fill_delay` paces the slot fills for display.
    pub async fn initialize(&mut self, generator: &ActionGenerator, fill_delay: Duration) -> usize {
        let phrases = match generator.generate(&[]).await {
            Ok(phrases) => phrases,
            Err(e) => {
                warn!("Failed to generate block batch: {}", e);
                return 0;
            }
        };

        let mut placed = 0;
        for phrase in phrases {
            match self.place(phrase) {
                Ok(slot) => {
                    placed += 1;
                    if slot.is_some() && !fill_delay.is_zero() {
                        tokio::time::sleep(fill_delay).await;
                    }
                }
                Err(reason) => debug!("Initial phrase dropped: {}", reason),
            }
        }
        info!("Pool initialized: {} placed, {} in backlog", placed, self.backlog.len());
        placed
    }
}
