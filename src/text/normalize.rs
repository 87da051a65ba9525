use regex::Regex;
use std::sync::OnceLock;

static TAG_RE: OnceLock<Regex> = OnceLock::new();
static ENTITY_RE: OnceLock<Regex> = OnceLock::new();
static SPACE_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

/// Entity leftovers that survive decoding (`&nbsp;`, numeric references).
fn entity_re() -> &'static Regex {
    ENTITY_RE.get_or_init(|| Regex::new(r"(?i)&nbsp;?|&#x?[0-9a-f]+;?").unwrap())
}

pub(crate) fn space_re() -> &'static Regex {
    SPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

const ALLOWED_PUNCTUATION: &str = ".,!?;:()'\"-&";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || ALLOWED_PUNCTUATION.contains(c)
}

/// Cleans raw generated or typed text.
///
/// Decodes the three common entities, strips markup, drops anything outside
/// printable ASCII letters/digits and a short punctuation set, then collapses
/// whitespace. Total: any input (including empty) yields a string.
pub fn normalize(raw: &str) -> String {
    let decoded = raw
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    let untagged = tag_re().replace_all(&decoded, " ");
    let unentitied = entity_re().replace_all(&untagged, " ");

    let filtered: String = unentitied
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if is_allowed(c) {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    space_re().replace_all(&filtered, " ").trim().to_string()
}
