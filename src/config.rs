// src/config.rs

use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let config: Config =
            serde_yaml::from_str(&contents).context("Failed to parse config YAML")?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    /// `PERIMETER_BACKEND_URL` overrides the remote backend URL either way.
    pub fn load_or_default(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::load(path)?
        } else {
            Config::default()
        };
        if let Ok(url) = std::env::var("PERIMETER_BACKEND_URL") {
            config.remote.url = url;
        }
        Ok(config)
    }
}
