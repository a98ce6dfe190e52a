//! Property tables: building them from annotated stylesheets and resolving
//! `var(--x)` references between their entries.

use crate::annotation::extract_blocks;
use crate::color;
use crate::error::{Result, TokenDocError};
use crate::types::{Declaration, ResolutionMode, Swatch};
use crate::utils::{css_var_to_camel_case, is_css_var};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Declarations keyed by their camelCase property name, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyTable {
    entries: IndexMap<String, Declaration>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its normalized key
    pub fn get(&self, key: &str) -> Option<&Declaration> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Declaration> {
        self.entries.get_mut(key)
    }

    /// Look up an entry by `--kebab`, `var(--kebab)` or camelCase name
    pub fn lookup(&self, name: &str) -> Option<&Declaration> {
        self.entries.get(&css_var_to_camel_case(name))
    }

    /// Insert or overwrite an entry, returning the replaced one
    pub fn insert(&mut self, key: impl Into<String>, declaration: Declaration) -> Option<Declaration> {
        self.entries.insert(key.into(), declaration)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Declaration)> {
        self.entries.iter()
    }

    /// Named colors of the palette block, in table order
    pub fn swatches(&self) -> Vec<Swatch> {
        self.entries
            .values()
            .filter(|decl| decl.is_color)
            .map(|decl| Swatch {
                name: decl.display_name().to_string(),
                color: decl.resolved_value.clone(),
            })
            .collect()
    }
}

/// Read an annotated stylesheet and merge its declarations into `seed`.
///
/// Entries already in the seed are overwritten by declarations with the same
/// key; pass a clone when the seed must stay untouched.
pub fn build_table(path: &Path, seed: PropertyTable) -> Result<PropertyTable> {
    let file = path.to_string_lossy();
    let content = fs::read_to_string(path).map_err(|e| TokenDocError::FileNotFound {
        path: format!("{}: {}", file, e),
    })?;
    build_table_from_source(&content, &file, seed)
}

/// Same as [`build_table`] for source text already in memory
pub fn build_table_from_source(source: &str, file: &str, mut seed: PropertyTable) -> Result<PropertyTable> {
    let blocks = extract_blocks(source.trim_end(), file)?;
    let mut seen = HashSet::new();

    for block in &blocks {
        let palette = block.is_color_palette();

        for css_decl in block.walk_declarations() {
            let key = css_var_to_camel_case(&css_decl.prop);

            if !css_decl.prop.starts_with("--") {
                log::warn!(
                    "{}:{}: '{}' in block '{}' is not a custom property",
                    file, css_decl.line, css_decl.prop, block.name
                );
            }
            if !seen.insert(key.clone()) {
                log::warn!(
                    "{}:{}: property '{}' redefined in the same file",
                    file, css_decl.line, css_decl.prop
                );
            }

            let mut declaration = Declaration::new(css_decl.prop.clone(), css_decl.value.clone());
            declaration.important = css_decl.important;
            declaration.line = css_decl.line;

            if palette {
                if color::is_color(&css_decl.value) {
                    declaration.is_color = true;
                } else {
                    log::debug!(
                        "{}:{}: '{}' is not a color literal, leaving it out of the swatches",
                        file, css_decl.line, css_decl.value
                    );
                }
            }

            seed.insert(key, declaration);
        }
    }

    log::debug!("{}: {} declarations from {} blocks", file, seen.len(), blocks.len());
    Ok(seed)
}

/// Replaces variable references in a property table with values
pub struct VariableResolver {
    mode: ResolutionMode,
    resolved_count: usize,
}

impl VariableResolver {
    pub fn new(mode: ResolutionMode) -> Self {
        Self {
            mode,
            resolved_count: 0,
        }
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Number of references rewritten since this resolver was created
    pub fn resolved_count(&self) -> usize {
        self.resolved_count
    }

    /// Resolve every reference in `table`; `file` names the source in errors
    pub fn resolve(&mut self, table: &mut PropertyTable, file: &str) -> Result<()> {
        match self.mode {
            ResolutionMode::SinglePass => self.resolve_single_pass(table, file),
            ResolutionMode::FixedPoint => self.resolve_fixed_point(table, file),
        }
    }

    /// One pass in table order. A reference to an entry later in the table
    /// copies that entry's current, possibly unresolved, value.
    fn resolve_single_pass(&mut self, table: &mut PropertyTable, file: &str) -> Result<()> {
        let keys: Vec<String> = table.keys().cloned().collect();

        for key in keys {
            let (property, current) = match table.get(&key) {
                Some(decl) if is_css_var(&decl.resolved_value) => {
                    (decl.original_property.clone(), decl.resolved_value.clone())
                }
                _ => continue,
            };

            let target = css_var_to_camel_case(&current);
            let value = table
                .get(&target)
                .map(|decl| decl.resolved_value.clone())
                .ok_or_else(|| TokenDocError::unresolved(file, &property, &current))?;

            if is_css_var(&value) {
                log::warn!(
                    "{}: '{}' copied the unresolved value '{}' of '{}'",
                    file, property, value, target
                );
            }

            if let Some(decl) = table.get_mut(&key) {
                decl.resolved_value = value;
            }
            self.resolved_count += 1;
        }

        Ok(())
    }

    fn resolve_fixed_point(&mut self, table: &mut PropertyTable, file: &str) -> Result<()> {
        let keys: Vec<String> = table.keys().cloned().collect();
        for key in keys {
            let mut visiting = Vec::new();
            self.resolve_entry(table, &key, file, &mut visiting)?;
        }
        Ok(())
    }

    /// Follow the reference chain starting at `key` down to a literal
    fn resolve_entry(
        &mut self,
        table: &mut PropertyTable,
        key: &str,
        file: &str,
        visiting: &mut Vec<String>,
    ) -> Result<String> {
        let (property, current) = match table.get(key) {
            Some(decl) => (decl.original_property.clone(), decl.resolved_value.clone()),
            None => return Err(TokenDocError::unresolved(file, key, key)),
        };

        if !is_css_var(&current) {
            return Ok(current);
        }

        if visiting.iter().any(|k| k == key) {
            let mut chain: Vec<String> = visiting
                .iter()
                .map(|k| table.get(k).map_or_else(|| k.clone(), |d| d.original_property.clone()))
                .collect();
            chain.push(property);
            return Err(TokenDocError::circular(file, &chain));
        }

        let target = css_var_to_camel_case(&current);
        if !table.contains_key(&target) {
            return Err(TokenDocError::unresolved(file, &property, &current));
        }

        visiting.push(key.to_string());
        let value = self.resolve_entry(table, &target, file, visiting)?;
        visiting.pop();

        if let Some(decl) = table.get_mut(key) {
            decl.resolved_value = value.clone();
        }
        self.resolved_count += 1;
        Ok(value)
    }
}
