//! Model name resolution.
//!
//! Claude Code sends Anthropic model ids; the upstream only serves its own
//! catalog. Ids already in that catalog pass through, legacy Claude ids map via
//! a fixed alias table, and anything else lands on [`DEFAULT_MODEL`].

use std::collections::HashMap;

/// Model served when nothing else matches.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Upstream model ids that are forwarded unchanged.
pub const SUPPORTED_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-thinking",
    "gemini-2.5-pro",
    "gemini-3-pro-low",
    "gemini-3-pro-high",
    "gemini-2.5-flash-lite",
    "gemini-2.5-flash-image",
    "claude-sonnet-4-5",
    "claude-sonnet-4-5-thinking",
    "claude-opus-4-5-thinking",
    "gpt-oss-120b-medium",
];

/// Legacy and Anthropic-facing ids mapped to an upstream id.
pub const MODEL_ALIASES: &[(&str, &str)] = &[
    ("claude-sonnet-4.5", "claude-sonnet-4-5"),
    ("claude-3-5-sonnet-20241022", "claude-sonnet-4-5"),
    ("claude-3-5-sonnet-20240620", "claude-sonnet-4-5"),
    ("claude-opus-4", "gemini-3-pro-high"),
    ("claude-haiku-4", "claude-haiku-4.5"),
    ("claude-3-haiku-20240307", "gemini-2.5-flash"),
];

/// Resolve a model id against the built-in tables only.
#[must_use]
pub fn map_model(model: &str) -> &'static str {
    if let Some(&supported) = SUPPORTED_MODELS.iter().find(|&&m| m == model) {
        return supported;
    }
    MODEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == model)
        .map_or(DEFAULT_MODEL, |&(_, target)| target)
}

/// Model resolution with operator overrides from the `[models]` config table.
///
/// Supported ids always pass through; overrides are consulted before the
/// built-in alias table.
#[derive(Debug, Clone, Default)]
pub struct ModelMapper {
    overrides: HashMap<String, String>,
}

impl ModelMapper {
    #[must_use]
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    #[must_use]
    pub fn resolve(&self, model: &str) -> String {
        if SUPPORTED_MODELS.contains(&model) {
            return model.to_string();
        }
        if let Some(target) = self.overrides.get(model) {
            return target.clone();
        }
        map_model(model).to_string()
    }

    /// Ids a client may ask for: the supported catalog plus override keys.
    #[must_use]
    pub fn advertised(&self) -> Vec<String> {
        let mut ids: Vec<String> = SUPPORTED_MODELS.iter().map(|m| (*m).to_string()).collect();
        let mut extra: Vec<&String> = self
            .overrides
            .keys()
            .filter(|k| !SUPPORTED_MODELS.contains(&k.as_str()))
            .collect();
        extra.sort();
        ids.extend(extra.into_iter().cloned());
        ids
    }
}
