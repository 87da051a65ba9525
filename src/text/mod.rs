//! Pure text heuristics: cleaning, verb/object reading, near-duplicate checks.

pub mod extract;
pub mod normalize;
pub mod similarity;

pub use extract::{extract, strip_artifacts, ActionParts};
pub use normalize::normalize;
pub use similarity::{is_similar, judge, Uniqueness};
