//! Error types for tokendoc

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenDocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {file} at line {line}: {message}")]
    Parse { file: String, line: usize, message: String },

    #[error("Unresolved variable reference in {file}: '{property}' refers to '{reference}', which is not defined")]
    UnresolvedReference { file: String, property: String, reference: String },

    #[error("Circular variable reference in {file}: {chain}")]
    CircularReference { file: String, chain: String },

    #[error("Unknown {kind} '{name}'")]
    Unknown { kind: String, name: String },

    #[error("Icon error: {message}")]
    Icon { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Watch error: {message}")]
    Watch { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, TokenDocError>;

impl TokenDocError {
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn unresolved(
        file: impl Into<String>,
        property: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self::UnresolvedReference {
            file: file.into(),
            property: property.into(),
            reference: reference.into(),
        }
    }

    pub fn circular(file: impl Into<String>, chain: &[String]) -> Self {
        Self::CircularReference {
            file: file.into(),
            chain: chain.join(" -> "),
        }
    }

    pub fn unknown(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Unknown {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn watch(message: impl Into<String>) -> Self {
        Self::Watch {
            message: message.into(),
        }
    }
}
