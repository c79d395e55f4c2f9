//! Error types raised by the analysis core.

use thiserror::Error;

/// Failure to turn raw configuration text into a labeled tree.
///
/// This is the only error the core pipeline raises. Every later stage is
/// total and degrades to defaults instead of failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input was empty or whitespace only.
    #[error("AST parsing failed: configuration text is empty")]
    EmptyInput,

    /// The JSON parser rejected the input.
    #[error("AST parsing failed: {0}")]
    Json(String),

    /// The YAML parser rejected the input.
    #[error("AST parsing failed: {0}")]
    Yaml(String),

    /// The YAML document parsed, but resolved to null.
    #[error("AST parsing failed: YAML document resolved to null")]
    EmptyDocument,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}
