//! Uniform labeled tree for parsed configuration documents.
//!
//! JSON and YAML both converge on [`LabeledNode`], so later stages never
//! need to know which format the text was written in.

pub mod builder;
pub mod detect;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};

pub use builder::{build, parse};
pub use detect::{detect, Format};

/// Key given to the root of every tree.
pub const ROOT_KEY: &str = "root";

/// Kind tag of a labeled node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A keyed container.
    Object,
    /// An indexed container.
    Array,
    /// An explicit null.
    Null,
    /// A string scalar.
    String,
    /// A numeric scalar.
    Number,
    /// A boolean scalar.
    Boolean,
}

/// Payload of a labeled node. Leaves carry a scalar, containers carry children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// Null leaf.
    Null,
    /// Boolean leaf.
    Boolean(bool),
    /// Numeric leaf.
    Number(Number),
    /// String leaf.
    String(String),
    /// Array container; children are keyed by their index.
    Array(Vec<LabeledNode>),
    /// Object container; children are keyed by field name, in document order.
    Object(Vec<LabeledNode>),
}

/// One position in the parsed document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledNode {
    /// Field name or stringified array index in the parent. `"root"` at the top.
    pub key: String,
    /// The node's scalar or children.
    pub value: NodeValue,
}

impl LabeledNode {
    /// Creates a node under the given key.
    pub fn new(key: impl Into<String>, value: NodeValue) -> Self {
        Self { key: key.into(), value }
    }

    /// Returns the kind tag of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match &self.value {
            NodeValue::Null => NodeKind::Null,
            NodeValue::Boolean(_) => NodeKind::Boolean,
            NodeValue::Number(_) => NodeKind::Number,
            NodeValue::String(_) => NodeKind::String,
            NodeValue::Array(_) => NodeKind::Array,
            NodeValue::Object(_) => NodeKind::Object,
        }
    }

    /// Immediate children; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[LabeledNode] {
        match &self.value {
            NodeValue::Array(children) | NodeValue::Object(children) => children,
            _ => &[],
        }
    }

    /// Returns `true` for object and array nodes.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.value, NodeValue::Array(_) | NodeValue::Object(_))
    }

    /// The scalar carried by a leaf, or `None` for containers.
    #[must_use]
    pub fn scalar(&self) -> Option<Value> {
        match &self.value {
            NodeValue::Null => Some(Value::Null),
            NodeValue::Boolean(b) => Some(Value::Bool(*b)),
            NodeValue::Number(n) => Some(Value::Number(n.clone())),
            NodeValue::String(s) => Some(Value::String(s.clone())),
            NodeValue::Array(_) | NodeValue::Object(_) => None,
        }
    }

    /// Materializes this subtree back into a plain value.
    #[must_use]
    pub fn to_plain(&self) -> Value {
        match &self.value {
            NodeValue::Array(children) => {
                Value::Array(children.iter().map(LabeledNode::to_plain).collect())
            }
            NodeValue::Object(children) => Value::Object(
                children.iter().map(|c| (c.key.clone(), c.to_plain())).collect(),
            ),
            _ => self.scalar().unwrap_or(Value::Null),
        }
    }

    /// Number of tree positions in this subtree, including this node.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(LabeledNode::size).sum::<usize>()
    }
}

impl Serialize for LabeledNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LabeledNode", 3)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("key", &self.key)?;
        match &self.value {
            NodeValue::Array(children) | NodeValue::Object(children) => {
                state.serialize_field("children", children)?;
            }
            _ => state.serialize_field("value", &self.scalar())?,
        }
        state.end()
    }
}

/// Metadata attached to a parse result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMetadata {
    /// Format the text was detected as.
    pub format: Format,
    /// When the text was parsed.
    pub parsed_at: DateTime<Utc>,
}

/// A parsed configuration document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    /// Root of the labeled tree.
    pub ast: LabeledNode,
    /// Format and timestamp.
    pub metadata: ParseMetadata,
}
