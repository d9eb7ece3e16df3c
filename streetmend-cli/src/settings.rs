use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use streetmend::PipelineConfig;

/// Contents of the `--config` TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pipeline: PipelineConfig,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
