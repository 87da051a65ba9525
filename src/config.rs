use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The character being mutated. Supplied by the presentation layer at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    pub name: String,
    pub description: String,
    /// Every composed scene sentence starts with this.
    pub scene_preamble: String,
    /// Initial scene description shown before any action lands.
    pub base_prompt: String,
    pub base_image: PathBuf,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: "Fanto".to_string(),
            description: "A cheerful elephant in a 3D animated style like Zootopia, ready for mayhem".to_string(),
            scene_preamble: "A cheerful 3D animated elephant".to_string(),
            base_prompt: "A cheerful 3D animated elephant standing upright, Zootopia style, high quality 3D render, \
                          white background, full body shot, modern Disney animation style, expressive face and eyes, \
                          friendly smile, clean 3D modeling, cinematic lighting, high production quality, centered composition"
                .to_string(),
            base_image: PathBuf::from("assets/fanto-base.png"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub slot_count: usize,
    /// Phrases requested per generation call.
    pub batch_size: usize,
    /// Backlog length under which a replenishment is requested.
    pub min_backlog: usize,
    /// Pause between slot fills at startup (presentation pacing only).
    pub fill_delay_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            slot_count: 5,
            batch_size: 10,
            min_backlog: 3,
            fill_delay_ms: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub together_api_key: Option<String>,
    pub fal_api_key: Option<String>,
    pub together_base_url: String,
    pub fal_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub image_steps: u32,
    pub debounce_ms: u64,
    pub pool: PoolConfig,
    pub character: Character,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            together_api_key: None,
            fal_api_key: None,
            together_base_url: "https://api.together.xyz".to_string(),
            fal_base_url: "https://fal.run".to_string(),
            text_model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            image_model: "black-forest-labs/FLUX.1-schnell".to_string(),
            image_steps: 10,
            debounce_ms: 1000,
            pool: PoolConfig::default(),
            character: Character::default(),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Reads a JSON config file, then lets the environment override it.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(key) = env_var("TOGETHER_API_KEY") {
            self.together_api_key = Some(key);
        }
        if let Some(key) = env_var("FAL_KEY") {
            self.fal_api_key = Some(key);
        }
        if let Some(url) = env_var("FANTO_TOGETHER_URL") {
            self.together_base_url = url;
        }
        if let Some(url) = env_var("FANTO_FAL_URL") {
            self.fal_base_url = url;
        }
        if let Some(model) = env_var("FANTO_TEXT_MODEL") {
            self.text_model = model;
        }
        if let Some(model) = env_var("FANTO_IMAGE_MODEL") {
            self.image_model = model;
        }
        if let Some(path) = env_var("FANTO_BASE_IMAGE") {
            self.character.base_image = PathBuf::from(path);
        }
        if let Some(ms) = env_var("FANTO_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.debounce_ms = ms;
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn has_text_credentials(&self) -> bool {
        self.together_api_key.is_some()
    }
}
