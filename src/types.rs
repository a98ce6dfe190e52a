//! Core data types shared across tokendoc

use serde::{Deserialize, Serialize};

/// Name of the annotation block whose declarations are candidate swatches
pub const COLOR_PALETTE_BLOCK: &str = "colorPalette";

/// Key under which the untouched default table is published
pub const DEFAULT_THEME_NAME: &str = "default";

/// Top-level template data keys that themes must not shadow
pub const RESERVED_TEMPLATE_KEYS: &[&str] = &["colorSwatches", "svgIcons", "releaseVersion"];

/// Prefix marking a value as a variable reference
pub const VAR_PREFIX: &str = "var";

/// Marker opening an annotation block comment
pub const BLOCK_START_MARKER: &str = "@start";

/// Marker closing an annotation block comment
pub const BLOCK_END_MARKER: &str = "@end";

/// A raw CSS declaration as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssDeclaration {
    pub prop: String,
    pub value: String,
    pub important: bool,
    pub line: usize,
}

/// A container of declarations inside an annotation block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockNode {
    /// `selector { ... }`
    Rule {
        selector: String,
        declarations: Vec<CssDeclaration>,
        line: usize,
    },
    /// A declaration written directly inside the block, outside any rule
    Declaration(CssDeclaration),
}

impl BlockNode {
    /// Every declaration held by this node, in source order
    pub fn declarations(&self) -> &[CssDeclaration] {
        match self {
            BlockNode::Rule { declarations, .. } => declarations,
            BlockNode::Declaration(decl) => std::slice::from_ref(decl),
        }
    }
}

/// A named, comment-delimited region of a stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationBlock {
    pub name: String,
    pub nodes: Vec<BlockNode>,
    pub line: usize,
}

impl AnnotationBlock {
    /// Walk the declarations of all nodes in order
    pub fn walk_declarations(&self) -> impl Iterator<Item = &CssDeclaration> {
        self.nodes.iter().flat_map(|node| node.declarations().iter())
    }

    pub fn is_color_palette(&self) -> bool {
        self.name == COLOR_PALETTE_BLOCK
    }
}

/// A custom property entry of a property table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(rename = "originalDeclaration")]
    pub original_property: String,

    #[serde(rename = "originalValue")]
    pub original_value: String,

    /// Value after reference resolution; equals `original_value` until resolved
    #[serde(rename = "value")]
    pub resolved_value: String,

    #[serde(rename = "isColor", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_color: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub important: bool,

    #[serde(skip)]
    pub line: usize,
}

impl Declaration {
    pub fn new(original_property: impl Into<String>, original_value: impl Into<String>) -> Self {
        let original_value = original_value.into();
        Self {
            original_property: original_property.into(),
            resolved_value: original_value.clone(),
            original_value,
            is_color: false,
            important: false,
            line: 0,
        }
    }

    /// Property name without its leading `--`
    pub fn display_name(&self) -> &str {
        self.original_property
            .strip_prefix("--")
            .unwrap_or(&self.original_property)
    }
}

/// Strategy used to replace variable references with values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMode {
    /// One linear pass in table order, copying whatever the referenced entry holds
    #[default]
    SinglePass,
    /// Follow reference chains to a literal, rejecting cycles
    FixedPoint,
}

/// A named color derived from the color palette block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swatch {
    pub name: String,
    pub color: String,
}
