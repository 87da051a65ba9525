use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::config::Character;
use crate::error::ServiceError;
use crate::services::{CompletionRequest, TextGeneration};
use crate::text::normalize::space_re;

struct Cleanup {
    code_fence: Regex,
    quotes: Regex,
    arrow: Regex,
    parenthetical: Regex,
}

static CLEANUP: OnceLock<Cleanup> = OnceLock::new();

fn cleanup() -> &'static Cleanup {
    CLEANUP.get_or_init(|| Cleanup {
        code_fence: Regex::new(r"(?s)```.*?```").unwrap(),
        quotes: Regex::new(r#"[`'"]"#).unwrap(),
        arrow: Regex::new(r"\s*-->\s*").unwrap(),
        parenthetical: Regex::new(r"\([^)]*\)").unwrap(),
    })
}

/// Strips code fences, quotes, arrows and asides from a model reply.
pub fn clean_description(raw: &str) -> String {
    let c = cleanup();
    let text = c.code_fence.replace_all(raw, "");
    let text = c.quotes.replace_all(&text, "");
    let text = c.arrow.replace_all(&text, " ");
    let text = c.parenthetical.replace_all(&text, "");
    space_re().replace_all(&text, " ").trim().to_string()
}

/// Turns the accumulated modification phrases into one scene sentence.
#[derive(Clone)]
pub struct SceneCompositor {
    text: Arc<dyn TextGeneration>,
    preamble: String,
    style: String,
}

impl SceneCompositor {
    pub fn new(text: Arc<dyn TextGeneration>, character: &Character) -> Self {
        Self {
            text,
            preamble: character.scene_preamble.clone(),
            style: "in a Zootopia/modern Disney animation style".to_string(),
        }
    }

    /// Used when both the primary and the fallback call fail.
    pub fn default_sentence(&self) -> String {
        format!("{} stands ready for the next action.", self.preamble)
    }

    pub fn primary_request(&self, phrases: &[String]) -> CompletionRequest {
        let system = format!(
            "You are a scene description generator that creates simple, clear descriptions of a character's current state.

Rules:
1. Write ONLY a single descriptive sentence
2. Focus on describing what is visually happening
3. Keep the tone light and playful
4. NO technical terms, metadata, or class definitions
5. NO internal model information
6. NO quotes or special characters
7. Start with \"{preamble}\" and then describe the modifications
8. Keep it concise and clear

Example input: \"Paint him blue\" and \"Make him dance\"
Example output: {preamble} covered in bright blue paint dances energetically with a big smile.",
            preamble = self.preamble
        );

        CompletionRequest {
            system,
            user: format!(
                "Base description: {} {}.\nAction commands: {}\n\nCreate a simple scene description showing the result of these actions.",
                self.preamble,
                self.style,
                phrases.join(" and ")
            ),
            temperature: 0.7,
            max_tokens: 200,
        }
    }

    pub fn fallback_request(&self, phrases: &[String]) -> CompletionRequest {
        CompletionRequest {
            system: "Create a simple, one-sentence description of the character with the applied actions. \
                     No technical terms or metadata."
                .to_string(),
            user: format!("Base: {}.\nActions: {}", self.preamble, phrases.join(" and ")),
            temperature: 0.7,
            max_tokens: 200,
        }
    }

    async fn attempt(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        let raw = self.text.complete(request).await?;
        let cleaned = clean_description(&raw);
        if cleaned.is_empty() {
            return Err(ServiceError::MalformedResponse("empty scene description".to_string()));
        }
        Ok(cleaned)
    }

    /// Never fails: primary prompt, then the simplified one, then the default sentence.
    pub async fn compose(&self, phrases: &[String]) -> String {
        if phrases.is_empty() {
            return self.default_sentence();
        }

        match self.attempt(self.primary_request(phrases)).await {
            Ok(description) => {
                info!("New prompt generated: {}", description);
                return description;
            }
            Err(e) => warn!("Failed to generate modified prompt: {}", e),
        }

        match self.attempt(self.fallback_request(phrases)).await {
            Ok(description) => {
                info!("Fallback prompt generated: {}", description);
                description
            }
            Err(e) => {
                warn!("Fallback scene generation failed: {}", e);
                self.default_sentence()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_model_artifacts() {
        let raw = "```json\n{\"x\":1}\n``` \"A cheerful elephant\" (note: pink) --> dances   wildly.";
        assert_eq!(clean_description(raw), "A cheerful elephant dances wildly.");
    }
}
