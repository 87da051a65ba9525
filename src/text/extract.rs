use regex::Regex;
use std::sync::OnceLock;

/// Pronouns, articles and prepositions that carry no action content.
pub const STOP_WORDS: &[&str] = &[
    "him", "his", "he", "the", "a", "an", "to", "at", "with", "on", "in", "for", "of", "by", "and",
];

/// Adjectives the generator sprinkles everywhere.
pub const FILLER_ADJECTIVES: &[&str] = &["good", "bad", "nice", "mean", "fun", "cool", "awesome", "great"];

/// Leading verbs too generic to tell two actions apart ("make him ...").
/// Matched as a bare prefix, so "putt" loses its "put" too.
pub const GENERIC_VERBS: &[&str] = &[
    "make", "have", "let", "force", "get", "give", "put", "throw", "drop", "stuff",
];

/// The `(verb, object)` reading of an action phrase. Either half may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionParts {
    pub verb: String,
    pub object: String,
}

impl ActionParts {
    /// True when either half is missing; such phrases are never unique.
    pub fn is_ambiguous(&self) -> bool {
        self.verb.is_empty() || self.object.is_empty()
    }
}

struct Rules {
    model_comment: Regex,
    trailing_new: Regex,
    parenthetical: Regex,
    trailing_bangs: Regex,
    stop_words: Regex,
    fillers: Regex,
    generic_verb: Regex,
}

static RULES: OnceLock<Rules> = OnceLock::new();

fn word_alternation(words: &[&str]) -> String {
    format!(r"\b({})\b", words.join("|"))
}

fn rules() -> &'static Rules {
    RULES.get_or_init(|| Rules {
        model_comment: Regex::new(r#"(?i)GM".*$"#).unwrap(),
        trailing_new: Regex::new(r"(?i)new.*$").unwrap(),
        parenthetical: Regex::new(r"\(.*?\)").unwrap(),
        trailing_bangs: Regex::new(r"!+$").unwrap(),
        stop_words: Regex::new(&word_alternation(STOP_WORDS)).unwrap(),
        fillers: Regex::new(&word_alternation(FILLER_ADJECTIVES)).unwrap(),
        generic_verb: Regex::new(&format!(r"^({})", GENERIC_VERBS.join("|"))).unwrap(),
    })
}

/// Removes generation artifacts: model commentary, a trailing "new..."
/// fragment, parenthetical asides and trailing exclamation marks.
pub fn strip_artifacts(text: &str) -> String {
    let r = rules();
    let text = r.model_comment.replace(text, "");
    let text = r.trailing_new.replace(&text, "");
    let text = r.parenthetical.replace_all(&text, "");
    let text = r.trailing_bangs.replace(text.trim_end(), "");
    text.trim().to_string()
}

/// Splits a cleaned phrase into a leading verb and a trailing object.
pub fn extract(phrase: &str) -> ActionParts {
    let r = rules();
    let lowered = strip_artifacts(phrase).to_lowercase();
    let lowered = r.stop_words.replace_all(&lowered, "");
    let lowered = r.fillers.replace_all(&lowered, "");
    let trimmed = lowered.trim();
    let without_verb = r.generic_verb.replace(trimmed, "");

    let mut words = without_verb.split_whitespace();
    let verb = words.next().unwrap_or_default().to_string();
    let object = words.collect::<Vec<_>>().join(" ");

    ActionParts { verb, object }
}
