use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::types::ActionPhrase;
use crate::error::{Rejection, ServiceError};
use crate::services::{CompletionRequest, TextGeneration};
use crate::text::normalize;

const BATCH_SYSTEM_PROMPT: &str = "Generate a list of unique, funny slapstick commands. \
Mix playful silliness with dark humor and potty jokes. Each command should be creative and different from the others.

Rules for each command:
1. Keep it under 6 words
2. Use simple language
3. One action per command
4. Must include \"him\" somewhere in the command
5. End with exclamation mark
6. Each must be unique in both action and object
7. Format as a numbered list
8. Vary sentence structure creatively
9. Include a mix of:
   - Classic slapstick (pies, slips, falls)
   - Dark humor (cartoonish mishaps, non-graphic)
   - Potty humor (poop, farts, burps)
   - Gross-out gags (slime, bugs, food)
   - Silly transformations
   - Embarrassing situations

Example formats:
1. Paint him neon pink!
2. Drop a piano on him!
3. Make him eat stinky cheese!
4. Cover him in bug slime!
5. Give him explosive diarrhea!
6. Unleash skunks around him!
7. Make him slip on poop!
8. Feed him rotten eggs!
9. Turn him into toilet paper!
10. Make him fart rainbows!

Keep it playful and cartoonish, never truly harmful.
Make sure each command is different from these existing actions:
";

const REWRITE_SYSTEM_PROMPT: &str = "You are a validator for slapstick action commands. Your job is to:
1. Check if the action meets these criteria:
   - Uses \"him\" instead of names
   - Is 6 words or less
   - Is a single, clear action
   - Is unique compared to existing actions
   - Has proper grammar and structure
2. If valid, return ONLY the processed action text
3. If invalid, return ONLY \"INVALID: [reason]\"

Example valid actions:
- \"Paint him neon pink!\"
- \"Launch him into space!\"
- \"Feed him hot peppers!\"

Example responses:
Input: \"make the elephant dance\"
Output: \"Make him dance!\"

Input: \"tickle him with feathers\" (when there's already a similar tickling action)
Output: \"INVALID: Too similar to existing action\"

Input: \"throw banana peels all around him and watch as he slips and falls repeatedly\"
Output: \"INVALID: Too long, exceeds 6 words\"
";

static NUMBERING_RE: OnceLock<Regex> = OnceLock::new();

fn numbering_re() -> &'static Regex {
    NUMBERING_RE.get_or_init(|| Regex::new(r"^\d+[.)]\s*").unwrap())
}

/// Turns a numbered list response into cleaned command lines.
/// Lines that do not end in "!" are not commands and are dropped.
pub fn parse_action_lines(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| normalize(&numbering_re().replace(line, "")))
        .filter(|line| !line.is_empty() && line.ends_with('!'))
        .collect()
}

/// Asks the text service for fresh action phrases.
#[derive(Clone)]
pub struct ActionGenerator {
    text: Arc<dyn TextGeneration>,
    batch_size: usize,
}

impl ActionGenerator {
    pub fn new(text: Arc<dyn TextGeneration>, batch_size: usize) -> Self {
        Self { text, batch_size }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_request(&self, exclusions: &[String]) -> CompletionRequest {
        CompletionRequest {
            system: format!("{}{}", BATCH_SYSTEM_PROMPT, exclusions.join("\n")),
            user: format!(
                "Generate {} unique slapstick commands. Include a good mix of classic slapstick, dark humor, \
                 and potty jokes. Make each one creative and different from the others and the existing actions. \
                 Use varied sentence structures.",
                self.batch_size
            ),
            temperature: 0.9,
            max_tokens: 500,
        }
    }

    /// One batch of phrases, unfiltered. Uniqueness is the pool's job.
    pub async fn generate(&self, exclusions: &[String]) -> Result<Vec<ActionPhrase>, ServiceError> {
        info!("Generating new batch of blocks ({} exclusions)", exclusions.len());
        let response = self.text.complete(self.batch_request(exclusions)).await?;
        let phrases: Vec<ActionPhrase> = parse_action_lines(&response)
            .into_iter()
            .map(ActionPhrase::generated)
            .collect();

        debug!("Generated batch: {:?}", phrases.iter().map(|p| &p.text).collect::<Vec<_>>());
        Ok(phrases)
    }

    pub fn rewrite_request(&self, text: &str, exclusions: &[String]) -> CompletionRequest {
        CompletionRequest {
            system: REWRITE_SYSTEM_PROMPT.to_string(),
            user: format!("Process this action: \"{}\"\nExisting actions: {}\n", text, exclusions.join(", ")),
            temperature: 0.7,
            max_tokens: 50,
        }
    }

    /// Lets the model validate and tidy a typed phrase.
    pub async fn rewrite(&self, text: &str, exclusions: &[String]) -> Result<String, Rejection> {
        match self.text.complete(self.rewrite_request(text, exclusions)).await {
            Ok(result) => {
                let result = result.trim();
                if let Some(reason) = result.strip_prefix("INVALID:") {
                    Err(Rejection::new(reason.trim()))
                } else {
                    Ok(normalize(result.trim_matches('"')))
                }
            }
            Err(ServiceError::MissingCredential { .. }) => Err(Rejection::new("API key missing")),
            Err(e) => {
                warn!("Validation error: {}", e);
                Err(Rejection::new("Failed to validate action"))
            }
        }
    }
}
