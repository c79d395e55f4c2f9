//! Compares two execution graphs node by node and edge by edge.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::Value;

use super::impact::{node_impact, property_impact};
use super::{ChangeKind, DiffChange, DiffMetadata, DiffResult, DiffSummary, Impact};
use crate::graph::{ExecutionGraph, ExecutionNode};
use crate::ports::clock::Clock;

/// Diffs `current` against `previous`. An absent previous graph is treated
/// as empty: every current node is reported as added and edges are skipped.
#[must_use]
pub fn diff(
    previous: Option<&ExecutionGraph>,
    current: &ExecutionGraph,
    clock: &dyn Clock,
) -> DiffResult {
    let changes = match previous {
        None => current.nodes.iter().map(|n| whole_node(n, ChangeKind::Added)).collect(),
        Some(previous) => compare_graphs(previous, current),
    };
    let summary = DiffSummary::from_changes(&changes);
    tracing::debug!(
        changes = changes.len(),
        high = summary.high_impact,
        baseline = previous.is_some(),
        "computed semantic diff"
    );
    DiffResult { changes, summary, metadata: DiffMetadata { compared_at: clock.now() } }
}

fn compare_graphs(previous: &ExecutionGraph, current: &ExecutionGraph) -> Vec<DiffChange> {
    let old_nodes: HashMap<&str, &ExecutionNode> =
        previous.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let new_ids: HashSet<&str> = current.nodes.iter().map(|n| n.id.as_str()).collect();

    let mut changes = Vec::new();

    for node in &current.nodes {
        match old_nodes.get(node.id.as_str()) {
            None => changes.push(whole_node(node, ChangeKind::Added)),
            Some(old) => {
                let field_changes = compare_nodes(old, node);
                if field_changes.is_empty() {
                    changes.push(DiffChange {
                        kind: ChangeKind::Unchanged,
                        path: node_path(node),
                        old_value: Some(to_value(old)),
                        new_value: Some(to_value(node)),
                        impact: Impact::None,
                    });
                } else {
                    changes.extend(field_changes);
                }
            }
        }
    }

    for node in &previous.nodes {
        if !new_ids.contains(node.id.as_str()) {
            changes.push(whole_node(node, ChangeKind::Removed));
        }
    }

    let old_edges: HashSet<String> = previous.edges.iter().map(|e| e.endpoint_key()).collect();
    let new_edges: HashSet<String> = current.edges.iter().map(|e| e.endpoint_key()).collect();

    let mut reported = HashSet::new();
    for edge in &current.edges {
        let key = edge.endpoint_key();
        if !old_edges.contains(&key) && reported.insert(key.clone()) {
            changes.push(edge_change(ChangeKind::Added, &key, None, Some(to_value(edge))));
        }
    }
    reported.clear();
    for edge in &previous.edges {
        let key = edge.endpoint_key();
        if !new_edges.contains(&key) && reported.insert(key.clone()) {
            changes.push(edge_change(ChangeKind::Removed, &key, Some(to_value(edge)), None));
        }
    }

    changes
}

/// Field-level differences between two versions of the same node.
fn compare_nodes(old: &ExecutionNode, new: &ExecutionNode) -> Vec<DiffChange> {
    let path = node_path(new);
    let mut changes = Vec::new();

    if old.role != new.role {
        changes.push(DiffChange {
            kind: ChangeKind::Modified,
            path: format!("{path}.role"),
            old_value: Some(to_value(&old.role)),
            new_value: Some(to_value(&new.role)),
            impact: Impact::High,
        });
    }

    let keys: BTreeSet<&String> = old.properties.keys().chain(new.properties.keys()).collect();
    for key in keys {
        let before = old.properties.get(key);
        let after = new.properties.get(key);
        let kind = match (before, after) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Removed,
            (Some(a), Some(b)) if !same_serialized(a, b) => ChangeKind::Modified,
            _ => continue,
        };
        changes.push(DiffChange {
            kind,
            path: format!("{path}.properties.{key}"),
            old_value: before.cloned(),
            new_value: after.cloned(),
            impact: property_impact(key),
        });
    }

    for dep in new.dependencies.iter().filter(|d| !old.dependencies.contains(d)) {
        changes.push(DiffChange {
            kind: ChangeKind::Added,
            path: format!("{path}.dependencies"),
            old_value: None,
            new_value: Some(Value::String(dep.clone())),
            impact: Impact::High,
        });
    }
    for dep in old.dependencies.iter().filter(|d| !new.dependencies.contains(d)) {
        changes.push(DiffChange {
            kind: ChangeKind::Removed,
            path: format!("{path}.dependencies"),
            old_value: Some(Value::String(dep.clone())),
            new_value: None,
            impact: Impact::High,
        });
    }

    changes
}

fn whole_node(node: &ExecutionNode, kind: ChangeKind) -> DiffChange {
    let value = Some(to_value(node));
    let (old_value, new_value) =
        if kind == ChangeKind::Removed { (value, None) } else { (None, value) };
    DiffChange {
        kind,
        path: node_path(node),
        old_value,
        new_value,
        impact: node_impact(node, kind),
    }
}

fn edge_change(
    kind: ChangeKind,
    key: &str,
    old_value: Option<Value>,
    new_value: Option<Value>,
) -> DiffChange {
    DiffChange { kind, path: format!("edge:{key}"), old_value, new_value, impact: Impact::Medium }
}

/// Compares values by their serialized text, so object key order matters.
fn same_serialized(a: &Value, b: &Value) -> bool {
    a.to_string() == b.to_string()
}

fn node_path(node: &ExecutionNode) -> String {
    format!("nodes.{}", node.id)
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
