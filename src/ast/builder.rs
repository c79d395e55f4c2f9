//! Converts parser output into a [`LabeledNode`] tree.

use serde_json::{Number, Value};
use serde_yaml::Value as YamlValue;

use super::{detect, Format, LabeledNode, NodeValue, ParseMetadata, ParsedDocument, ROOT_KEY};
use crate::error::ParseError;
use crate::ports::clock::Clock;

/// Detects the format of `text`, builds its tree, and stamps the result.
///
/// # Errors
///
/// Returns [`ParseError::EmptyInput`] for blank text, or the underlying
/// parser's error when the text is malformed.
pub fn parse(text: &str, clock: &dyn Clock) -> Result<ParsedDocument, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let format = detect(text);
    let ast = build(text, format)?;
    tracing::debug!(%format, nodes = ast.size(), "parsed configuration");
    Ok(ParsedDocument { ast, metadata: ParseMetadata { format, parsed_at: clock.now() } })
}

/// Parses `text` as `format` and converts it into a labeled tree rooted at `"root"`.
///
/// # Errors
///
/// Returns the parser's error, or [`ParseError::EmptyDocument`] when a YAML
/// document resolves to null.
pub fn build(text: &str, format: Format) -> Result<LabeledNode, ParseError> {
    match format {
        Format::Json => {
            let value: Value = serde_json::from_str(text)?;
            Ok(from_json(ROOT_KEY.to_string(), value))
        }
        Format::Yaml => {
            let value: YamlValue = serde_yaml::from_str(text)?;
            if value.is_null() {
                return Err(ParseError::EmptyDocument);
            }
            Ok(from_yaml(ROOT_KEY.to_string(), value))
        }
    }
}

fn from_json(key: String, value: Value) -> LabeledNode {
    let value = match value {
        Value::Null => NodeValue::Null,
        Value::Bool(b) => NodeValue::Boolean(b),
        Value::Number(n) => NodeValue::Number(n),
        Value::String(s) => NodeValue::String(s),
        Value::Array(items) => NodeValue::Array(
            items.into_iter().enumerate().map(|(i, item)| from_json(i.to_string(), item)).collect(),
        ),
        Value::Object(map) => {
            NodeValue::Object(map.into_iter().map(|(k, v)| from_json(k, v)).collect())
        }
    };
    LabeledNode { key, value }
}

fn from_yaml(key: String, value: YamlValue) -> LabeledNode {
    let value = match value {
        YamlValue::Null => NodeValue::Null,
        YamlValue::Bool(b) => NodeValue::Boolean(b),
        YamlValue::Number(n) => yaml_number(&n),
        YamlValue::String(s) => NodeValue::String(s),
        YamlValue::Sequence(items) => NodeValue::Array(
            items.into_iter().enumerate().map(|(i, item)| from_yaml(i.to_string(), item)).collect(),
        ),
        YamlValue::Mapping(map) => {
            NodeValue::Object(map.into_iter().map(|(k, v)| from_yaml(yaml_key(&k), v)).collect())
        }
        YamlValue::Tagged(tagged) => return from_yaml(key, tagged.value),
    };
    LabeledNode { key, value }
}

fn yaml_number(n: &serde_yaml::Number) -> NodeValue {
    if let Some(i) = n.as_i64() {
        NodeValue::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        NodeValue::Number(u.into())
    } else {
        // NaN and infinities have no JSON representation.
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or_else(|| NodeValue::String(n.to_string()), NodeValue::Number)
    }
}

fn yaml_key(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::FixedClock;
    use crate::ast::NodeKind;

    #[test]
    fn json_object_keeps_document_order() {
        let tree = build(r#"{"zeta": 1, "alpha": 2}"#, Format::Json).unwrap();
        let keys: Vec<&str> = tree.children().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(tree.key, "root");
        assert_eq!(tree.kind(), NodeKind::Object);
    }

    #[test]
    fn json_array_children_keyed_by_index() {
        let tree = build(r#"[true, null, "x"]"#, Format::Json).unwrap();
        let kinds: Vec<(String, NodeKind)> =
            tree.children().iter().map(|c| (c.key.clone(), c.kind())).collect();
        assert_eq!(
            kinds,
            vec![
                ("0".to_string(), NodeKind::Boolean),
                ("1".to_string(), NodeKind::Null),
                ("2".to_string(), NodeKind::String),
            ]
        );
    }

    #[test]
    fn yaml_and_json_converge_on_same_tree() {
        let json = build(
            r#"{"database": {"host": "db", "port": 5432, "tags": ["a", "b"], "ssl": false}}"#,
            Format::Json,
        )
        .unwrap();
        let yaml = build(
            "database:\n  host: db\n  port: 5432\n  tags:\n    - a\n    - b\n  ssl: false\n",
            Format::Yaml,
        )
        .unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn yaml_non_string_keys_are_stringified() {
        let tree = build("1: one\ntrue: yes\n", Format::Yaml).unwrap();
        let keys: Vec<&str> = tree.children().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "true"]);
    }

    #[test]
    fn yaml_tagged_value_uses_inner_value() {
        let tree = build("secret: !vault abc\n", Format::Yaml).unwrap();
        assert_eq!(tree.children()[0].scalar(), Some(Value::String("abc".into())));
    }

    #[test]
    fn yaml_infinity_becomes_string() {
        let tree = build("limit: .inf\n", Format::Yaml).unwrap();
        assert_eq!(tree.children()[0].kind(), NodeKind::String);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = build("{not json", Format::Json).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = build("key: [unclosed", Format::Yaml).unwrap_err();
        assert!(matches!(err, ParseError::Yaml(_)));
    }

    #[test]
    fn yaml_null_document_is_rejected() {
        assert_eq!(build("~", Format::Yaml).unwrap_err(), ParseError::EmptyDocument);
    }

    #[test]
    fn parse_detects_format_and_stamps_time() {
        let clock = FixedClock::at("2025-06-15T10:00:00Z");
        let doc = parse("name: api\n", &clock).unwrap();
        assert_eq!(doc.metadata.format, Format::Yaml);
        assert_eq!(doc.metadata.parsed_at.to_rfc3339(), "2025-06-15T10:00:00+00:00");
    }

    #[test]
    fn parse_rejects_blank_text() {
        let clock = FixedClock::at("2025-06-15T10:00:00Z");
        assert_eq!(parse("  \n ", &clock).unwrap_err(), ParseError::EmptyInput);
    }
}
