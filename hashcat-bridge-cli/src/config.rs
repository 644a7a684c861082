//! Configuration loading and parsing

use anyhow::{Context, Result};
use hashcat_bridge::{HostOptions, SessionOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub host: HostOptions,
    #[serde(default)]
    pub job: JobConfig,
}

/// Default job settings, overridden by command-line flags
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JobConfig {
    /// Engine option string, e.g. "--hash-type=0 --attack-mode=0"
    pub options: Option<String>,
    pub input_file: Option<String>,
    pub dictionary: Option<String>,
}

impl JobConfig {
    /// Session options described by this section
    pub fn session_options(&self) -> Result<SessionOptions> {
        let mut options = match &self.options {
            Some(text) => SessionOptions::parse(text)
                .with_context(|| format!("Invalid [job] options: {:?}", text))?,
            None => SessionOptions::default(),
        };

        if let Some(input) = &self.input_file {
            options.input_file = input.clone();
        }
        if let Some(dict) = &self.dictionary {
            options.dictionary_mask_directory = Some(dict.clone());
        }
        Ok(options)
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
