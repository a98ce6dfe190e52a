//! Icon name discovery

use crate::error::{Result, TokenDocError};
use std::path::Path;
use walkdir::WalkDir;

/// Names of the `.svg` files directly inside `icons_dir`, sorted by file name.
///
/// The name is the file name up to its last `.`.
pub fn parse_icons(icons_dir: &Path) -> Result<Vec<String>> {
    if !icons_dir.is_dir() {
        return Err(TokenDocError::Icon {
            message: format!("icon directory '{}' does not exist", icons_dir.display()),
        });
    }

    let mut icons = Vec::new();
    for entry in WalkDir::new(icons_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| TokenDocError::Icon {
            message: format!("Directory traversal error: {}", e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if !file_name.ends_with(".svg") {
            continue;
        }
        if let Some(dot) = file_name.rfind('.') {
            icons.push(file_name[..dot].to_string());
        }
    }

    log::debug!("Found {} icons in {}", icons.len(), icons_dir.display());
    Ok(icons)
}
