// FILE: src/cli/config.rs

use crate::error::{Result, TokenDocError};
use crate::types::ResolutionMode;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeEntry {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub variables_file: Option<String>,
    pub themes: Option<Vec<ThemeEntry>>,
    pub icons_directory: Option<String>,
    pub output_file: Option<String>,
    pub release_version: Option<String>,
    pub resolution: Option<ResolutionMode>,
}

pub fn load(config_path: &str) -> Result<ProjectConfig> {
    let config_content = fs::read_to_string(config_path).map_err(|e| {
        TokenDocError::FileNotFound {
            path: format!("Config file {}: {}", config_path, e),
        }
    })?;

    let config: ProjectConfig = if config_path.ends_with(".json") {
        serde_json::from_str(&config_content).map_err(|e| TokenDocError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content).map_err(|e| TokenDocError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })
    } else {
        Err(TokenDocError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        })
    }?;

    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}
