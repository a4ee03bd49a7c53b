//! Error types for the proxy.
//!
//! Translation itself never fails; everything here comes from configuration,
//! the upstream call, or the orphan policy refusing a request.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Environment variable '{env}' not set. Export an OAuth access token for Code Assist.")]
    MissingToken { env: String },

    #[error("Unknown endpoint '{name}' and no base_url configured. Known endpoints: {known}")]
    UnknownEndpoint { name: String, known: String },

    #[error("Upstream error: {message}")]
    Upstream { message: String },

    #[error("Request contains tool calls or results without a counterpart: {summary}")]
    OrphanedToolParts { summary: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ProxyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream {
            message: msg.into(),
        }
    }

    /// Whether the caller sent something we refuse to forward, as opposed to
    /// an upstream or local failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::OrphanedToolParts { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_orphans_are_client_errors() {
        let orphan = ProxyError::OrphanedToolParts {
            summary: "unpaired tool_use 'a'".to_string(),
        };
        assert!(orphan.is_client_error());
        assert!(orphan.to_string().ends_with("unpaired tool_use 'a'"));

        assert!(!ProxyError::upstream("timeout").is_client_error());
        assert!(!ProxyError::MissingToken { env: "X".to_string() }.is_client_error());
    }
}
