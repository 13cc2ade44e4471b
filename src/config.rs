use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::merge::Encoder;

/// Application configuration loaded from ~/.config/audiobind/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bind: BindConfig,
}

/// Defaults for the bind command, all overridable from the CLI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BindConfig {
    /// Default audio encoder
    pub encoder: Option<Encoder>,

    /// Default audio bitrate, e.g. "64k"
    pub bitrate: Option<String>,

    /// Default grouping regex used when --group is passed without
    /// --group-pattern
    pub group_pattern: Option<String>,
}

impl Config {
    /// Load configuration from the default path (~/.config/audiobind/config.toml)
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("audiobind").join("config.toml"))
    }

    /// Get the encoder, with CLI override taking precedence
    pub fn encoder(&self, cli_override: Option<Encoder>) -> Encoder {
        cli_override.or(self.bind.encoder).unwrap_or(Encoder::Aac)
    }

    /// Get the bitrate, with CLI override taking precedence
    pub fn bitrate(&self, cli_override: Option<&str>) -> Option<String> {
        cli_override
            .map(String::from)
            .or_else(|| self.bind.bitrate.clone())
    }

    /// Get the grouping pattern, with CLI override taking precedence
    pub fn group_pattern(&self, cli_override: Option<&str>) -> Option<String> {
        cli_override
            .map(String::from)
            .or_else(|| self.bind.group_pattern.clone())
    }
}
