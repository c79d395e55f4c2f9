//! Format detection from leading characters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON object or array.
    Json,
    /// Anything else.
    Yaml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Yaml => f.write_str("yaml"),
        }
    }
}

/// Classifies text as JSON when its first non-whitespace character opens an
/// object or array, and as YAML otherwise.
#[must_use]
pub fn detect(text: &str) -> Format {
    match text.trim_start().chars().next() {
        Some('{' | '[') => Format::Json,
        _ => Format::Yaml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braces_and_brackets_are_json() {
        assert_eq!(detect("{\"a\": 1}"), Format::Json);
        assert_eq!(detect("  \n[1, 2]"), Format::Json);
    }

    #[test]
    fn everything_else_is_yaml() {
        assert_eq!(detect("a: 1"), Format::Yaml);
        assert_eq!(detect("- item"), Format::Yaml);
        assert_eq!(detect("# comment\n{}"), Format::Yaml);
        assert_eq!(detect(""), Format::Yaml);
    }
}
