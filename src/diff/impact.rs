//! Keyword heuristics that grade the impact of a change.

use super::{ChangeKind, Impact};
use crate::graph::ExecutionNode;

/// Substrings that make a property security-sensitive.
pub const SECURITY_KEYWORDS: [&str; 6] =
    ["password", "secret", "key", "token", "auth", "permission"];

/// Extra substring that only counts when grading a whole node.
pub const NODE_SECURITY_KEYWORD: &str = "access";

/// Substrings that make a property connectivity-sensitive.
pub const CONNECTIVITY_KEYWORDS: [&str; 5] = ["port", "host", "url", "endpoint", "timeout"];

/// Grades a property-level change by the property's key.
#[must_use]
pub fn property_impact(key: &str) -> Impact {
    let key = key.to_lowercase();
    if SECURITY_KEYWORDS.iter().any(|kw| key.contains(kw)) {
        Impact::High
    } else if CONNECTIVITY_KEYWORDS.iter().any(|kw| key.contains(kw)) {
        Impact::Medium
    } else {
        Impact::Low
    }
}

/// Grades the addition or removal of a whole node.
#[must_use]
pub fn node_impact(node: &ExecutionNode, kind: ChangeKind) -> Impact {
    match kind {
        ChangeKind::Unchanged => return Impact::None,
        ChangeKind::Added | ChangeKind::Removed | ChangeKind::Modified => {}
    }

    // The tree path carries ancestor keys; only the node's own fields count.
    let mut fields = serde_json::to_value(node).unwrap_or_default();
    if let Some(map) = fields.as_object_mut() {
        map.remove("path");
    }
    let serialized = fields.to_string().to_lowercase();
    let sensitive = SECURITY_KEYWORDS
        .iter()
        .chain(std::iter::once(&NODE_SECURITY_KEYWORD))
        .any(|kw| serialized.contains(kw));

    if sensitive {
        Impact::High
    } else if node.role.is_control() {
        if kind == ChangeKind::Removed {
            Impact::High
        } else {
            Impact::Medium
        }
    } else if !node.dependencies.is_empty() {
        Impact::Medium
    } else {
        Impact::Low
    }
}
