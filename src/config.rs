use crate::endpoints::EndpointPreset;
use crate::error::{ProxyError, Result};
use crate::models::ModelMapper;
use crate::translate::request::DEFAULT_SESSION_ID;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "claude-gemini-proxy";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub models: HashMap<String, String>,
    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,
}

/// What to do with tool calls/results that have no counterpart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Drop them, record the event, and forward the rest.
    #[default]
    Drop,
    /// Refuse the request.
    Reject,
}

fn default_port() -> u16 {
    4222
}

fn default_endpoint() -> String {
    "daily".to_string()
}

fn default_access_token_env() -> String {
    "ANTIGRAVITY_ACCESS_TOKEN".to_string()
}

impl ProxyConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProxyError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        if config.upstream.project.trim().is_empty() {
            return Err(ProxyError::config(format!(
                "upstream.project is empty in {}",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Search standard locations for a config file.
    /// Priority: CLI arg > CWD > XDG config > home dir
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        let candidates = config_search_paths();
        for candidate in &candidates {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(candidate);
            }
        }

        Err(ProxyError::config(format!(
            "No config file found. Searched: {}. Create one from config.example.toml",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Resolve the effective base URL (config override or endpoint preset)
    pub fn effective_base_url(&self) -> Result<String> {
        if let Some(ref url) = self.upstream.base_url {
            return Ok(url.clone());
        }

        let preset = EndpointPreset::from_name(&self.upstream.endpoint).ok_or_else(|| {
            ProxyError::UnknownEndpoint {
                name: self.upstream.endpoint.clone(),
                known: EndpointPreset::names().join(", "),
            }
        })?;

        Ok(preset.base_url.to_string())
    }

    /// Resolve the bearer token from the configured environment variable
    pub fn resolve_access_token(&self) -> Result<String> {
        std::env::var(&self.upstream.access_token_env).map_err(|_| ProxyError::MissingToken {
            env: self.upstream.access_token_env.clone(),
        })
    }

    pub fn session_id(&self) -> &str {
        self.upstream
            .session_id
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_ID)
    }

    pub fn model_mapper(&self) -> ModelMapper {
        ModelMapper::new(self.models.clone())
    }
}

/// Candidate config locations, most specific first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // CWD
    paths.push(PathBuf::from(format!("{APP_NAME}.toml")));

    // XDG / platform config dir
    if cfg!(target_os = "macos") {
        if let Some(home) = home_dir() {
            paths.push(
                home.join("Library")
                    .join("Application Support")
                    .join(APP_NAME)
                    .join("config.toml"),
            );
        }
    } else {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join(APP_NAME).join("config.toml"));
        }
        if let Some(home) = home_dir() {
            paths.push(home.join(".config").join(APP_NAME).join("config.toml"));
        }
    }

    // Home directory fallback
    if let Some(home) = home_dir() {
        paths.push(home.join(format!(".{APP_NAME}.toml")));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
