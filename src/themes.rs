//! Per-theme property tables
//!
//! The default stylesheet is built and resolved first. Every theme then starts
//! from its own deep copy of the resolved default table, overlays its theme
//! file and is resolved in turn.

use crate::error::{Result, TokenDocError};
use crate::property_table::{build_table, PropertyTable, VariableResolver};
use crate::types::{ResolutionMode, DEFAULT_THEME_NAME, RESERVED_TEMPLATE_KEYS};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A named theme and the stylesheet overriding the defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSource {
    pub name: String,
    pub path: PathBuf,
}

impl ThemeSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Resolved tables keyed by theme name, `default` first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeSet {
    tables: IndexMap<String, PropertyTable>,
}

impl ThemeSet {
    pub fn default_table(&self) -> Option<&PropertyTable> {
        self.tables.get(DEFAULT_THEME_NAME)
    }

    pub fn get(&self, theme: &str) -> Option<&PropertyTable> {
        self.tables.get(theme)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.tables.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyTable)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of entries across all tables
    pub fn declaration_count(&self) -> usize {
        self.tables.values().map(PropertyTable::len).sum()
    }
}

/// Statistics gathered while building a [`ThemeSet`]
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ThemeBuildStats {
    pub table_count: usize,
    pub declaration_count: usize,
    pub references_resolved: usize,
}

pub struct ThemeSetBuilder {
    resolver: VariableResolver,
}

impl ThemeSetBuilder {
    pub fn new(mode: ResolutionMode) -> Self {
        Self {
            resolver: VariableResolver::new(mode),
        }
    }

    pub fn build(&mut self, variables_file: &Path, themes: &[ThemeSource]) -> Result<(ThemeSet, ThemeBuildStats)> {
        validate_theme_names(themes)?;

        log::debug!(
            "Building default table from {} ({:?} resolution)",
            variables_file.display(),
            self.resolver.mode()
        );
        let mut default_table = build_table(variables_file, PropertyTable::new())?;
        self.resolver
            .resolve(&mut default_table, &variables_file.to_string_lossy())?;

        let mut tables = IndexMap::new();
        tables.insert(DEFAULT_THEME_NAME.to_string(), default_table);

        for theme in themes {
            log::debug!("Building theme '{}' from {}", theme.name, theme.path.display());
            let seed = tables[DEFAULT_THEME_NAME].clone();
            let mut table = build_table(&theme.path, seed)?;
            self.resolver
                .resolve(&mut table, &theme.path.to_string_lossy())?;
            tables.insert(theme.name.clone(), table);
        }

        let set = ThemeSet { tables };
        let stats = ThemeBuildStats {
            table_count: set.len(),
            declaration_count: set.declaration_count(),
            references_resolved: self.resolver.resolved_count(),
        };
        Ok((set, stats))
    }
}

/// Build the default table and one table per theme
pub fn build_theme_set(variables_file: &Path, themes: &[ThemeSource], mode: ResolutionMode) -> Result<ThemeSet> {
    let (set, _stats) = ThemeSetBuilder::new(mode).build(variables_file, themes)?;
    Ok(set)
}

fn validate_theme_names(themes: &[ThemeSource]) -> Result<()> {
    let mut names = HashSet::new();
    for theme in themes {
        if theme.name.is_empty() {
            return Err(TokenDocError::config("theme name must not be empty"));
        }
        if theme.name == DEFAULT_THEME_NAME {
            return Err(TokenDocError::config(format!(
                "'{}' is reserved for the untouched defaults and cannot name a theme",
                DEFAULT_THEME_NAME
            )));
        }
        if RESERVED_TEMPLATE_KEYS.contains(&theme.name.as_str()) {
            return Err(TokenDocError::config(format!(
                "theme name '{}' collides with a template data key",
                theme.name
            )));
        }
        if !names.insert(theme.name.as_str()) {
            return Err(TokenDocError::config(format!("theme '{}' is defined twice", theme.name)));
        }
    }
    Ok(())
}
