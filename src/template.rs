//! Template data handed to the documentation renderer

use crate::error::{Result, TokenDocError};
use crate::themes::ThemeSet;
use crate::types::Swatch;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Everything the documentation templates read.
///
/// Serializes as one object: each theme table under its theme name, next to
/// `colorSwatches`, `svgIcons` and, when known, `releaseVersion`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
    #[serde(flatten)]
    pub annotations: ThemeSet,

    pub color_swatches: Vec<Swatch>,

    pub svg_icons: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_version: Option<String>,
}

impl TemplateData {
    pub fn new(annotations: ThemeSet, svg_icons: Vec<String>) -> Self {
        let color_swatches = annotations
            .default_table()
            .map(|table| table.swatches())
            .unwrap_or_default();
        Self {
            annotations,
            color_swatches,
            svg_icons,
            release_version: None,
        }
    }

    pub fn with_release_version(mut self, version: Option<String>) -> Self {
        self.release_version = version;
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TokenDocError::InvalidFormat {
            message: format!("JSON serialization error: {}", e),
        })
    }

    /// Write the JSON form to `path`, creating parent directories; returns bytes written
    pub fn write_json(&self, path: &Path) -> Result<u64> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &json)?;
        Ok(json.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::{build_theme_set, ThemeSource};
    use crate::types::ResolutionMode;
    use tempfile::TempDir;

    fn theme_set(dir: &TempDir) -> ThemeSet {
        let defaults = dir.path().join("vars.css");
        let dark = dir.path().join("dark.css");
        fs::write(
            &defaults,
            "/* @start colorPalette */\n:root { --brand-blue: #336699; --brand-bad: not-a-color; }\n/* @end */",
        )
        .unwrap();
        fs::write(&dark, "/* @start dark */\n:root { --link: var(--brand-blue); }\n/* @end */").unwrap();
        build_theme_set(&defaults, &[ThemeSource::new("themeDark", dark)], ResolutionMode::SinglePass).unwrap()
    }

    #[test]
    fn test_template_data_shape() {
        let dir = TempDir::new().unwrap();
        let data = TemplateData::new(theme_set(&dir), vec!["home".to_string(), "user-profile".to_string()])
            .with_release_version(Some("1.2.3".to_string()));

        let json: serde_json::Value = serde_json::from_str(&data.to_json().unwrap()).unwrap();
        assert_eq!(json["default"]["brandBlue"]["value"], "#336699");
        assert_eq!(json["themeDark"]["link"]["value"], "#336699");
        assert_eq!(json["colorSwatches"], serde_json::json!([{ "name": "brand-blue", "color": "#336699" }]));
        assert_eq!(json["svgIcons"], serde_json::json!(["home", "user-profile"]));
        assert_eq!(json["releaseVersion"], "1.2.3");
    }

    #[test]
    fn test_release_version_is_optional() {
        let dir = TempDir::new().unwrap();
        let data = TemplateData::new(theme_set(&dir), Vec::new());
        let json: serde_json::Value = serde_json::from_str(&data.to_json().unwrap()).unwrap();
        assert!(json.get("releaseVersion").is_none());
    }

    #[test]
    fn test_write_json_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let data = TemplateData::new(theme_set(&dir), Vec::new());
        let out = dir.path().join("www").join("data").join("template-data.json");
        let written = data.write_json(&out).unwrap();
        assert_eq!(written, fs::metadata(&out).unwrap().len());
    }
}
