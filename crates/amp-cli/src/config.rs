//! Configuration file loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use amp_model::RawTransformConfig;

/// Supported configuration file formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Parses configuration text without validating it.
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<RawTransformConfig> {
    match format {
        ConfigFormat::Json => serde_json::from_str(text).context("parse JSON configuration"),
        ConfigFormat::Toml => toml::from_str(text).context("parse TOML configuration"),
    }
}

/// Reads and parses a configuration file without validating it.
pub fn load_config(path: &Path) -> Result<RawTransformConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read configuration {}", path.display()))?;
    parse_config(&text, ConfigFormat::from_path(path))
        .with_context(|| format!("load configuration {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("amp.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("amp.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("amp.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("amp")), ConfigFormat::Json);
    }

    #[test]
    fn toml_uses_camel_case_keys() {
        let raw = parse_config(
            r#"
apiKey = "12345"
includeEntities = "all"
amplitudeTime = "current"

[[entityExclusionRules]]
key = "contexts_com_acme_debug_1"
version = "free"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(raw.api_key, "12345");
        assert_eq!(raw.include_entities, "all");
        assert_eq!(raw.entity_exclusion_rules.len(), 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_config("{ apiKey: ", ConfigFormat::Json).is_err());
    }
}
