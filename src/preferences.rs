//! Chat preferences persisted through the settings table
//!
//! The chat UI reads these on start and writes them back when the user
//! saves. Values that are out of range, or that name a model or preset
//! that is no longer offered, fall back to the defaults on load.

use crate::error::Result;
use crate::storage::ConversationStore;
use serde::{Deserialize, Serialize};

/// Models offered by the chat UI. The first entry is the default.
pub const MODEL_OPTIONS: &[&str] = &[
    "claude-haiku-4-5-20251001",
    "claude-3-5-haiku-20241022",
    "claude-sonnet-4-5-20250929",
    "claude-sonnet-4-20250514",
    "claude-opus-4-1-20250805",
    "claude-opus-4-20250514",
    "claude-3-7-sonnet-20250219",
    "claude-3-haiku-20240307",
];

/// Named system prompts. The first entry is the default.
pub const SYSTEM_PRESETS: &[(&str, &str)] = &[
    (
        "Default",
        "You are a helpful AI learning assistant that specializes in explaining AI concepts and helping with coding.",
    ),
    (
        "Code Tutor",
        "You are an expert programming tutor. Provide code examples, explain concepts step by step, and focus on best practices.",
    ),
    (
        "AI Teacher",
        "You are an AI learning companion. Break down complex topics, use analogies, and encourage hands-on experimentation.",
    ),
    (
        "Project Mentor",
        "You are a project mentor helping build and improve this AI assistant. Suggest improvements, explain architectural decisions, and guide development.",
    ),
];

/// Settings key for the selected model
pub const MODEL_KEY: &str = "model";
/// Settings key for the sampling temperature
pub const TEMPERATURE_KEY: &str = "temperature";
/// Settings key for the response token cap
pub const MAX_TOKENS_KEY: &str = "max_tokens";
/// Settings key for the system prompt preset
pub const PRESET_KEY: &str = "preset";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const MIN_MAX_TOKENS: u32 = 100;
const MAX_MAX_TOKENS: u32 = 4096;

/// System prompt for a preset name
pub fn system_prompt_for(preset: &str) -> Option<&'static str> {
    SYSTEM_PRESETS
        .iter()
        .find(|(name, _)| *name == preset)
        .map(|(_, prompt)| *prompt)
}

/// Preferences the chat UI sends along with each request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPreferences {
    /// Model identifier
    pub model: String,
    /// Sampling temperature in `[0.0, 1.0]`
    pub temperature: f32,
    /// Response token cap in `[100, 4096]`
    pub max_tokens: u32,
    /// Name of an entry in [`SYSTEM_PRESETS`]
    pub preset: String,
}

impl Default for ChatPreferences {
    fn default() -> Self {
        Self {
            model: MODEL_OPTIONS[0].to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            preset: SYSTEM_PRESETS[0].0.to_string(),
        }
    }
}

impl ChatPreferences {
    /// Read preferences from the store, applying defaults for missing keys
    ///
    /// # Errors
    ///
    /// Propagates `CorruptSetting` when a stored value has the wrong shape
    pub fn load(store: &ConversationStore) -> Result<Self> {
        let defaults = Self::default();
        let loaded = Self {
            model: store.get_setting(MODEL_KEY, defaults.model)?,
            temperature: store.get_setting(TEMPERATURE_KEY, defaults.temperature)?,
            max_tokens: store.get_setting(MAX_TOKENS_KEY, defaults.max_tokens)?,
            preset: store.get_setting(PRESET_KEY, defaults.preset)?,
        };
        Ok(loaded.normalized())
    }

    /// Write all four preference keys
    pub fn save(&self, store: &ConversationStore) -> Result<()> {
        let prefs = self.clone().normalized();
        store.save_setting(MODEL_KEY, &prefs.model)?;
        store.save_setting(TEMPERATURE_KEY, &prefs.temperature)?;
        store.save_setting(MAX_TOKENS_KEY, &prefs.max_tokens)?;
        store.save_setting(PRESET_KEY, &prefs.preset)?;
        tracing::info!(model = %prefs.model, preset = %prefs.preset, "Saved chat preferences");
        Ok(())
    }

    /// Replace unknown choices with defaults and clamp numeric ranges
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        if !MODEL_OPTIONS.contains(&self.model.as_str()) {
            tracing::debug!(model = %self.model, "Unknown model, using default");
            self.model = defaults.model;
        }
        if system_prompt_for(&self.preset).is_none() {
            tracing::debug!(preset = %self.preset, "Unknown preset, using default");
            self.preset = defaults.preset;
        }
        self.temperature = if self.temperature.is_finite() {
            self.temperature.clamp(0.0, 1.0)
        } else {
            defaults.temperature
        };
        self.max_tokens = self.max_tokens.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS);
        self
    }

    /// System prompt for the selected preset
    pub fn system_message(&self) -> &'static str {
        system_prompt_for(&self.preset).unwrap_or(SYSTEM_PRESETS[0].1)
    }
}
