//! Execution model inferred from a labeled configuration tree.

pub mod builder;
pub mod reference;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use builder::{build, GraphOptions};

/// Role an execution node plays in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// An object carrying an `action`, `handler`, or `type` field.
    Action,
    /// An object carrying a `condition`, `if`, or `when` field.
    Condition,
    /// Everything else.
    Resource,
    /// Reserved for nodes that only exist to be depended upon.
    Dependency,
}

impl NodeRole {
    /// Returns `true` for roles whose removal or addition changes control flow.
    #[must_use]
    pub fn is_control(self) -> bool {
        matches!(self, Self::Action | Self::Condition)
    }
}

/// One unit of the execution model, derived 1:1 from a tree position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionNode {
    /// Stable identifier, `node_<executionOrder>`.
    pub id: String,
    /// Inferred role.
    pub role: NodeRole,
    /// Key of the originating tree node.
    pub name: String,
    /// Tree path, e.g. `root.database.hosts[0]`.
    #[serde(default)]
    pub path: String,
    /// Flattened immediate children (or `value` for leaves).
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    /// Ids of nodes this node references, deduplicated.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Pre-order visitation index.
    pub execution_order: usize,
}

/// Derives the node id for a visitation index.
#[must_use]
pub fn node_id(order: usize) -> String {
    format!("node_{order}")
}

/// Kind of relationship between two execution nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// The target references the source.
    Dependency,
    /// The target is guarded by the source.
    Conditional,
    /// The target follows the source in document order.
    Sequential,
}

/// Directed edge between two nodes of the same graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Relationship kind.
    pub kind: EdgeKind,
}

impl Edge {
    /// Identity used for cross-graph comparison; ignores the kind.
    #[must_use]
    pub fn endpoint_key(&self) -> String {
        format!("{}->{}", self.from, self.to)
    }
}

/// Counts and timestamp for a generated graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// When the graph was generated.
    pub generated_at: DateTime<Utc>,
}

/// Nodes and edges inferred from one configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionGraph {
    /// Nodes in execution order.
    pub nodes: Vec<ExecutionNode>,
    /// Grouped by target node: its dependency edges, then its incoming sequential edge.
    pub edges: Vec<Edge>,
    /// Counts and timestamp.
    pub metadata: GraphMetadata,
}

impl ExecutionGraph {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ExecutionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Looks up the first node with the given name.
    #[must_use]
    pub fn node_named(&self, name: &str) -> Option<&ExecutionNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Edges of the given kind.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }
}
