//! Reference-token scanning and resolution against known nodes.
//!
//! A reference token is `${inner}` or a bare `$inner`. The inner text is
//! matched against node names (exact) and node paths (substring).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_.\-\[\]]*)")
        .expect("reference pattern is valid")
});

/// Collects the inner text of every reference token found in `value`,
/// descending through arrays and objects.
pub fn collect_tokens(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(tokens_in(s)),
        Value::Array(items) => items.iter().for_each(|v| collect_tokens(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_tokens(v, out)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Inner text of each reference token in `text`, in order of appearance.
pub fn tokens_in(text: &str) -> impl Iterator<Item = String> + '_ {
    REFERENCE.captures_iter(text).filter_map(|caps| {
        caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().trim().to_string())
    })
}

/// Entries listed under a `depends_on` property: a scalar or a list of scalars.
#[must_use]
pub fn depends_on_entries(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A node as seen by the resolver.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Node id.
    pub id: &'a str,
    /// Node name.
    pub name: &'a str,
    /// Node path.
    pub path: &'a str,
}

/// Resolves reference text against candidates ordered by path.
pub struct Resolver<'a> {
    candidates: Vec<Candidate<'a>>,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver; candidates are sorted by path for a stable match order.
    #[must_use]
    pub fn new(mut candidates: Vec<Candidate<'a>>) -> Self {
        candidates.sort_by(|a, b| a.path.cmp(b.path).then_with(|| a.id.cmp(b.id)));
        Self { candidates }
    }

    /// Ids of every node whose path contains `text` or whose name equals it.
    pub fn resolve<'s>(&'s self, text: &'s str) -> impl Iterator<Item = &'a str> + 's {
        self.candidates
            .iter()
            .filter(move |c| !text.is_empty() && (c.path.contains(text) || c.name == text))
            .map(|c| c.id)
    }
}
