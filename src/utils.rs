//! Utility functions for tokendoc

use crate::types::VAR_PREFIX;
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn kebab_segment_regex() -> &'static Regex {
    static KEBAB: OnceLock<Regex> = OnceLock::new();
    KEBAB.get_or_init(|| Regex::new(r"-([a-z])").expect("static regex"))
}

fn important_regex() -> &'static Regex {
    static IMPORTANT: OnceLock<Regex> = OnceLock::new();
    IMPORTANT.get_or_init(|| Regex::new(r"(?i)\s*!\s*important\s*$").expect("static regex"))
}

/// Convert a custom property name into its camelCase lookup key.
///
/// Accepts `--kebab-name` as well as `var(--kebab-name)`. Only the first
/// `var(` and the first `)` are removed, then everything up to and including
/// the first `--`. Input without `--` is left alone, so the conversion is
/// idempotent on its own output.
pub fn css_var_to_camel_case(name: &str) -> String {
    let unwrapped = name.replacen("var(", "", 1).replacen(')', "", 1);
    let unwrapped = unwrapped.trim();

    let bare = match unwrapped.find("--") {
        Some(index) => &unwrapped[index + 2..],
        None => unwrapped,
    };

    kebab_segment_regex()
        .replace_all(bare, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

/// Whether a declared value is a variable reference
pub fn is_css_var(value: &str) -> bool {
    value.starts_with(VAR_PREFIX)
}

/// Split a trailing `!important` off a declaration value
pub fn split_important(raw_value: &str) -> (String, bool) {
    let trimmed = raw_value.trim();
    match important_regex().find(trimmed) {
        Some(found) => (trimmed[..found.start()].trim_end().to_string(), true),
        None => (trimmed.to_string(), false),
    }
}
