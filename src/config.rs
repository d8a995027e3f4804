use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::language::Language;
use crate::translation::{DEFAULT_TRANSLATE_ENDPOINT, TranslatorKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Language preselected in the output language selector
    #[serde(default)]
    pub default_language: Language,

    /// Which service translates the generated title and description
    #[serde(default)]
    pub translator: TranslatorKind,

    /// Endpoint used by the Google translator
    #[serde(default = "default_translate_endpoint")]
    pub translate_endpoint: String,

    /// Run a tiny generation at startup so the first request is fast
    #[serde(default = "default_warm_model")]
    pub warm_model: bool,
}

fn default_translate_endpoint() -> String {
    DEFAULT_TRANSLATE_ENDPOINT.to_string()
}

fn default_warm_model() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            translator: TranslatorKind::default(),
            translate_endpoint: default_translate_endpoint(),
            warm_model: default_warm_model(),
        }
    }
}

impl Config {
    /// Get the default config file path: ~/.config/listing-scribe/config.toml
    pub fn default_config_path() -> Result<PathBuf> {
        let home_dir = std::env::home_dir().context("Could not determine home directory")?;

        Ok(home_dir
            .join(".config")
            .join("listing-scribe")
            .join("config.toml"))
    }

    /// Load config from a file path, creating default config if file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            let config = Config::default();
            config.save_to_path(path)?;
            Ok(config)
        }
    }

    /// Load config from default location or provided override
    pub fn load(config_path_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path_override {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        Self::load_from_path(&config_path)
    }

    /// Save config to a file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}
