//! Built-in Code Assist endpoint presets.
//!
//! Users pick an endpoint by name in their config and the preset fills in the
//! base URL. A `base_url` in the config always wins over the preset.

#[derive(Debug, Clone)]
pub struct EndpointPreset {
    pub name: &'static str,
    pub base_url: &'static str,
}

const PRESETS: &[EndpointPreset] = &[
    EndpointPreset {
        name: "daily",
        base_url: "https://daily-cloudcode-pa.googleapis.com",
    },
    EndpointPreset {
        name: "sandbox",
        base_url: "https://daily-cloudcode-pa.sandbox.googleapis.com",
    },
    EndpointPreset {
        name: "prod",
        base_url: "https://cloudcode-pa.googleapis.com",
    },
];

/// Path of the non-streaming generate call, relative to the base URL.
pub const GENERATE_PATH: &str = "/v1internal:generateContent";

impl EndpointPreset {
    #[must_use]
    pub fn from_name(name: &str) -> Option<&'static EndpointPreset> {
        PRESETS.iter().find(|p| p.name == name.to_lowercase())
    }

    #[must_use]
    pub fn all() -> &'static [EndpointPreset] {
        PRESETS
    }

    #[must_use]
    pub fn names() -> Vec<&'static str> {
        PRESETS.iter().map(|p| p.name).collect()
    }
}

/// Join a base URL and [`GENERATE_PATH`].
#[must_use]
pub fn generate_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_endpoints() {
        assert!(EndpointPreset::from_name("daily").is_some());
        assert!(EndpointPreset::from_name("Sandbox").is_some()); // case-insensitive
        assert!(EndpointPreset::from_name("staging").is_none());
    }

    #[test]
    fn test_all_presets_are_https() {
        for preset in EndpointPreset::all() {
            assert!(
                preset.base_url.starts_with("https://"),
                "Endpoint {} should use https",
                preset.name
            );
        }
    }

    #[test]
    fn test_generate_url_trims_slash() {
        assert_eq!(
            generate_url("https://cloudcode-pa.googleapis.com/"),
            "https://cloudcode-pa.googleapis.com/v1internal:generateContent"
        );
    }
}
