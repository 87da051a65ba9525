use super::extract::{extract, ActionParts};

/// Verbs match when equal or when one contains the other.
pub fn verbs_similar(a: &str, b: &str) -> bool {
    a == b || a.contains(b) || b.contains(a)
}

/// An empty object is the single empty token, which every token contains.
fn tokens(object: &str) -> Vec<&str> {
    if object.is_empty() {
        vec![""]
    } else {
        object.split_whitespace().collect()
    }
}

/// Objects match when any token of one contains, or is contained in, any
/// token of the other.
pub fn objects_similar(a: &str, b: &str) -> bool {
    let right_tokens = tokens(b);
    tokens(a).into_iter().any(|left| {
        right_tokens
            .iter()
            .any(|right| left.contains(right) || right.contains(left))
    })
}

fn parts_similar(a: &ActionParts, b: &ActionParts) -> bool {
    verbs_similar(&a.verb, &b.verb) && objects_similar(&a.object, &b.object)
}

/// Near-duplicate check between two action phrases.
pub fn is_similar(a: &str, b: &str) -> bool {
    parts_similar(&extract(a), &extract(b))
}

/// Outcome of checking a candidate against the phrases already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uniqueness<'a> {
    Unique(ActionParts),
    /// No verb or no object could be read; rejected conservatively.
    Ambiguous,
    SimilarTo(&'a str),
}

/// Judges `candidate` against every phrase in `known`.
pub fn judge<'a, I>(candidate: &str, known: I) -> Uniqueness<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let parts = extract(candidate);
    if parts.is_ambiguous() {
        return Uniqueness::Ambiguous;
    }

    for existing in known {
        if parts_similar(&extract(existing), &parts) {
            return Uniqueness::SimilarTo(existing);
        }
    }

    Uniqueness::Unique(parts)
}
