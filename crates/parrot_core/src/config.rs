use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub server_name: String,
    /// Built-in parrot id (`chrome_131`, ...) or a path to a profile document.
    pub profile: String,
    pub log_filter: String,
    /// Replaces the OS random source with a seeded generator.
    pub deterministic_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: "example.com".to_string(),
            profile: "chrome_131".to_string(),
            log_filter: "info".to_string(),
            deterministic_seed: None,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml("server_name = \"www.example.org\"\ndeterministic_seed = 7\n").unwrap();
        assert_eq!(config.server_name, "www.example.org");
        assert_eq!(config.deterministic_seed, Some(7));
        assert_eq!(config.profile, "chrome_131");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(Config::from_toml("deterministic_seed = \"seven\"").is_err());
    }
}
