//! Builds an [`ExecutionGraph`] from a labeled tree.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use super::reference::{self, Candidate, Resolver};
use super::{node_id, Edge, EdgeKind, ExecutionGraph, ExecutionNode, GraphMetadata, NodeRole};
use crate::ast::{LabeledNode, NodeValue, ROOT_KEY};
use crate::ports::clock::Clock;

/// Child keys that mark an object as an action.
const ACTION_KEYS: [&str; 3] = ["action", "handler", "type"];
/// Child keys that mark an object as a condition.
const CONDITION_KEYS: [&str; 3] = ["condition", "if", "when"];
/// Property naming explicit dependencies.
const DEPENDS_ON: &str = "depends_on";

/// Tuning knobs for graph inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    /// Whether a node whose reference resolves to itself gets a self-loop.
    pub allow_self_references: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self { allow_self_references: true }
    }
}

/// Walks `root` in pre-order and infers nodes, roles, properties, and edges.
#[must_use]
pub fn build(root: &LabeledNode, options: GraphOptions, clock: &dyn Clock) -> ExecutionGraph {
    let mut nodes = Vec::with_capacity(root.size());
    visit(root, ROOT_KEY.to_string(), &mut nodes);

    let resolved = resolve_dependencies(&nodes, options);
    let mut edges = Vec::new();
    let mut seen: HashSet<Edge> = HashSet::new();
    let mut previous: Option<String> = None;
    for (node, deps) in nodes.iter_mut().zip(resolved) {
        for dep in &deps {
            let edge = Edge { from: dep.clone(), to: node.id.clone(), kind: EdgeKind::Dependency };
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        }
        if let Some(prev) = previous.replace(node.id.clone()) {
            edges.push(Edge { from: prev, to: node.id.clone(), kind: EdgeKind::Sequential });
        }
        node.dependencies = deps;
    }

    tracing::debug!(nodes = nodes.len(), edges = edges.len(), "built execution graph");

    let metadata = GraphMetadata {
        node_count: nodes.len(),
        edge_count: edges.len(),
        generated_at: clock.now(),
    };
    ExecutionGraph { nodes, edges, metadata }
}

fn visit(node: &LabeledNode, path: String, out: &mut Vec<ExecutionNode>) {
    let order = out.len();
    out.push(ExecutionNode {
        id: node_id(order),
        role: classify(node),
        name: node.key.clone(),
        path: path.clone(),
        properties: extract_properties(node),
        dependencies: Vec::new(),
        execution_order: order,
    });

    match &node.value {
        NodeValue::Object(children) => {
            for child in children {
                visit(child, format!("{path}.{}", child.key), out);
            }
        }
        NodeValue::Array(children) => {
            for (index, child) in children.iter().enumerate() {
                visit(child, format!("{path}[{index}]"), out);
            }
        }
        _ => {}
    }
}

fn classify(node: &LabeledNode) -> NodeRole {
    let NodeValue::Object(children) = &node.value else {
        return NodeRole::Resource;
    };
    if has_child_key(children, &CONDITION_KEYS) {
        NodeRole::Condition
    } else if has_child_key(children, &ACTION_KEYS) {
        NodeRole::Action
    } else {
        NodeRole::Resource
    }
}

fn has_child_key(children: &[LabeledNode], keys: &[&str]) -> bool {
    children.iter().any(|c| keys.iter().any(|k| *k == c.key))
}

fn extract_properties(node: &LabeledNode) -> BTreeMap<String, Value> {
    if node.is_container() {
        node.children().iter().map(|c| (c.key.clone(), c.to_plain())).collect()
    } else {
        node.scalar().map(|v| BTreeMap::from([("value".to_string(), v)])).unwrap_or_default()
    }
}

/// Dependency ids for each node, in the same order as `nodes`.
fn resolve_dependencies(nodes: &[ExecutionNode], options: GraphOptions) -> Vec<Vec<String>> {
    let resolver = Resolver::new(
        nodes
            .iter()
            .map(|n| Candidate { id: &n.id, name: &n.name, path: &n.path })
            .collect(),
    );

    nodes
        .iter()
        .map(|node| {
            let mut wanted = Vec::new();
            for value in node.properties.values() {
                reference::collect_tokens(value, &mut wanted);
            }
            if let Some(listed) = node.properties.get(DEPENDS_ON) {
                wanted.extend(reference::depends_on_entries(listed));
            }

            let mut deps: Vec<String> = Vec::new();
            for text in &wanted {
                for id in resolver.resolve(text) {
                    let is_self = id == node.id;
                    if is_self && !options.allow_self_references {
                        continue;
                    }
                    if !deps.iter().any(|d| d == id) {
                        deps.push(id.to_string());
                    }
                }
            }
            deps
        })
        .collect()
}
