//! tokendoc: design-token data from annotated CSS
//!
//! Reads stylesheets whose custom properties are grouped in comment-delimited
//! annotation blocks, builds a property table per theme and resolves
//! `var(--x)` references into the values documentation templates display.
//!
//! # Basic Usage
//!
//! ```no_run
//! use tokendoc::{build_template_data, BuildOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let (data, stats) = build_template_data(&BuildOptions::default())?;
//!     println!("{} swatches, {} icons", data.color_swatches.len(), stats.icon_count);
//!     Ok(())
//! }
//! ```
//!
//! # Build Pipeline
//!
//! 1. **Blocks**: split each stylesheet into its annotation blocks
//! 2. **Default table**: record every declaration of the variables file, then resolve references
//! 3. **Theme tables**: copy the default table, overlay the theme file, resolve again
//! 4. **Icons**: list the `.svg` files of the icon directory
//! 5. **Template data**: tables, swatches, icons and release version as one JSON document

pub mod annotation;
pub mod cli;
pub mod color;
pub mod error;
pub mod icons;
pub mod property_table;
pub mod template;
pub mod themes;
pub mod types;
pub mod utils;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

// Re-export commonly used types and functions
pub use annotation::extract_blocks;
pub use color::is_color;
pub use error::{Result, TokenDocError};
pub use icons::parse_icons;
pub use property_table::{build_table, build_table_from_source, PropertyTable, VariableResolver};
pub use template::TemplateData;
pub use themes::{build_theme_set, ThemeBuildStats, ThemeSet, ThemeSetBuilder, ThemeSource};
pub use types::*;
pub use utils::{css_var_to_camel_case, is_css_var};
pub use cli::Cli;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Inputs of one template data build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Stylesheet holding the default custom properties
    pub variables_file: PathBuf,

    /// Themes in the order they are published
    pub themes: Vec<ThemeSource>,

    /// Directory of `.svg` icons; no icon list when unset
    pub icons_directory: Option<PathBuf>,

    /// Version string exposed to templates
    pub release_version: Option<String>,

    pub resolution_mode: ResolutionMode,

    /// Log each pipeline phase
    pub debug_mode: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            variables_file: PathBuf::from("src/css/components/_variables.css"),
            themes: vec![
                ThemeSource::new("themeDark", "src/css/themes/_theme-dark.css"),
                ThemeSource::new("themeHighContrast", "src/css/themes/_theme-high-contrast.css"),
            ],
            icons_directory: Some(PathBuf::from("src/icons/svg")),
            release_version: None,
            resolution_mode: ResolutionMode::SinglePass,
            debug_mode: false,
        }
    }
}

impl BuildOptions {
    /// Every file and directory a rebuild depends on
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.variables_file.clone()];
        paths.extend(self.themes.iter().map(|theme| theme.path.clone()));
        if let Some(icons) = &self.icons_directory {
            paths.push(icons.clone());
        }
        paths
    }
}

/// Build statistics and metrics
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    /// Number of property tables, `default` included
    pub table_count: usize,

    /// Entries across all tables
    pub declaration_count: usize,

    /// Variable references rewritten
    pub references_resolved: usize,

    pub swatch_count: usize,

    pub icon_count: usize,

    /// Size of the written JSON in bytes
    pub output_size: u64,

    pub build_time_ms: u64,
}

/// Build template data from scratch
pub fn build_template_data(options: &BuildOptions) -> Result<(TemplateData, BuildStats)> {
    let start_time = Instant::now();

    if options.debug_mode {
        log::info!("{} v{}", NAME, VERSION);
        log::debug!("Build options: {:?}", options);
        log::debug!("Phase 1: Building property tables ({:?})...", options.resolution_mode);
    }

    let (annotations, theme_stats) = ThemeSetBuilder::new(options.resolution_mode)
        .build(&options.variables_file, &options.themes)?;

    if options.debug_mode {
        log::debug!(
            "Phase 1 complete. {} tables, {} references resolved",
            theme_stats.table_count,
            theme_stats.references_resolved
        );
        log::debug!("Phase 2: Collecting icons...");
    }

    let svg_icons = match &options.icons_directory {
        Some(dir) => parse_icons(dir)?,
        None => Vec::new(),
    };

    let data = TemplateData::new(annotations, svg_icons)
        .with_release_version(options.release_version.clone());

    let stats = BuildStats {
        table_count: theme_stats.table_count,
        declaration_count: theme_stats.declaration_count,
        references_resolved: theme_stats.references_resolved,
        swatch_count: data.color_swatches.len(),
        icon_count: data.svg_icons.len(),
        output_size: 0,
        build_time_ms: start_time.elapsed().as_millis() as u64,
    };

    if options.debug_mode {
        log::debug!("Phase 2 complete. {} icons", stats.icon_count);
    }

    Ok((data, stats))
}

/// Build template data and write it as JSON to `output_path`
pub fn build_to_file(options: &BuildOptions, output_path: &Path) -> Result<BuildStats> {
    let start_time = Instant::now();
    let (data, mut stats) = build_template_data(options)?;

    stats.output_size = data.write_json(output_path)?;
    stats.build_time_ms = start_time.elapsed().as_millis() as u64;

    log::info!(
        "Wrote {} ({} bytes, {} tables, {} swatches, {} icons) in {}ms",
        output_path.display(),
        stats.output_size,
        stats.table_count,
        stats.swatch_count,
        stats.icon_count,
        stats.build_time_ms
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_project(dir: &TempDir) -> BuildOptions {
        let root = dir.path();
        fs::create_dir_all(root.join("css/themes")).unwrap();
        fs::create_dir_all(root.join("icons")).unwrap();

        fs::write(
            root.join("css/_variables.css"),
            r#"/* @start colorPalette */
:root {
  --primary-color: #ff0000;
  --brand-blue: #336699;
  --brand-bad: not-a-color;
}
/* @end */
"#,
        )
        .unwrap();
        fs::write(
            root.join("css/themes/_theme-dark.css"),
            "/* @start themeDark */\n:root { --accent-color: var(--primary-color); }\n/* @end */\n",
        )
        .unwrap();
        fs::write(root.join("icons/home.svg"), "<svg/>").unwrap();
        fs::write(root.join("icons/user-profile.svg"), "<svg/>").unwrap();

        BuildOptions {
            variables_file: root.join("css/_variables.css"),
            themes: vec![ThemeSource::new("themeDark", root.join("css/themes/_theme-dark.css"))],
            icons_directory: Some(root.join("icons")),
            release_version: Some("2.0.0".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_template_data() {
        let dir = TempDir::new().unwrap();
        let options = create_project(&dir);

        let (data, stats) = build_template_data(&options).unwrap();
        assert_eq!(
            data.annotations.get("themeDark").unwrap().get("accentColor").unwrap().resolved_value,
            "#ff0000"
        );
        assert_eq!(
            data.color_swatches,
            vec![
                Swatch { name: "primary-color".to_string(), color: "#ff0000".to_string() },
                Swatch { name: "brand-blue".to_string(), color: "#336699".to_string() },
            ]
        );
        assert_eq!(data.svg_icons, vec!["home", "user-profile"]);
        assert_eq!(stats.table_count, 2);
        assert_eq!(stats.references_resolved, 1);
        assert_eq!(stats.swatch_count, 2);
        assert_eq!(stats.icon_count, 2);
    }

    #[test]
    fn test_build_to_file() {
        let dir = TempDir::new().unwrap();
        let options = create_project(&dir);
        let output = dir.path().join("www/template-data.json");

        let stats = build_to_file(&options, &output).unwrap();
        assert!(stats.output_size > 0);

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["releaseVersion"], "2.0.0");
        assert_eq!(json["themeDark"]["accentColor"]["value"], "#ff0000");
    }

    #[test]
    fn test_rebuilds_are_independent() {
        let dir = TempDir::new().unwrap();
        let options = create_project(&dir);

        let (first, _) = build_template_data(&options).unwrap();
        fs::remove_file(dir.path().join("icons/home.svg")).unwrap();
        let (second, _) = build_template_data(&options).unwrap();

        assert_eq!(first.svg_icons.len(), 2);
        assert_eq!(second.svg_icons, vec!["user-profile"]);
    }

    #[test]
    fn test_without_icon_directory() {
        let dir = TempDir::new().unwrap();
        let options = BuildOptions {
            icons_directory: None,
            ..create_project(&dir)
        };
        let (data, _) = build_template_data(&options).unwrap();
        assert!(data.svg_icons.is_empty());
    }

    #[test]
    fn test_missing_variables_file_fails() {
        let dir = TempDir::new().unwrap();
        let options = BuildOptions {
            variables_file: dir.path().join("nope.css"),
            ..create_project(&dir)
        };
        assert!(matches!(
            build_template_data(&options),
            Err(TokenDocError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_watched_paths() {
        let options = BuildOptions::default();
        let paths = options.watched_paths();
        assert_eq!(paths.len(), 4);
        assert_eq!(paths[0], PathBuf::from("src/css/components/_variables.css"));
    }
}
