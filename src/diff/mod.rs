//! Semantic diff between two execution graphs.

pub mod engine;
pub mod impact;

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use engine::diff;

/// What happened to a node, field, or edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present only in the current graph.
    Added,
    /// Present only in the previous graph.
    Removed,
    /// Present in both with a different value.
    Modified,
    /// Present in both and identical.
    Unchanged,
}

/// Coarse severity attached to a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Nothing changed.
    None,
    /// Cosmetic or unclassified change.
    Low,
    /// Connectivity or wiring change.
    Medium,
    /// Security-sensitive or control-flow change.
    High,
}

/// One classified difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffChange {
    /// Change classification.
    pub kind: ChangeKind,
    /// Dotted location, e.g. `nodes.node_1.properties.password`.
    pub path: String,
    /// Value before the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Value after the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    /// Severity.
    pub impact: Impact,
}

/// Per-kind and per-impact counts over a change list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    /// Number of `added` changes.
    pub added: usize,
    /// Number of `removed` changes.
    pub removed: usize,
    /// Number of `modified` changes.
    pub modified: usize,
    /// Number of `unchanged` changes.
    pub unchanged: usize,
    /// Number of high-impact changes.
    pub high_impact: usize,
    /// Number of medium-impact changes.
    pub medium_impact: usize,
    /// Number of low-impact changes.
    pub low_impact: usize,
    /// Number of changes with no impact.
    pub no_impact: usize,
}

impl DiffSummary {
    /// Tallies a complete change list.
    #[must_use]
    pub fn from_changes(changes: &[DiffChange]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            match change.kind {
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Removed => summary.removed += 1,
                ChangeKind::Modified => summary.modified += 1,
                ChangeKind::Unchanged => summary.unchanged += 1,
            }
            match change.impact {
                Impact::High => summary.high_impact += 1,
                Impact::Medium => summary.medium_impact += 1,
                Impact::Low => summary.low_impact += 1,
                Impact::None => summary.no_impact += 1,
            }
        }
        summary
    }
}

/// When a diff was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffMetadata {
    /// Comparison timestamp.
    pub compared_at: DateTime<Utc>,
}

/// Full result of comparing two graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Changes in emission order.
    pub changes: Vec<DiffChange>,
    /// Aggregate counts.
    pub summary: DiffSummary,
    /// Timestamp.
    pub metadata: DiffMetadata,
}

impl DiffResult {
    /// Changes other than `unchanged`.
    pub fn effective_changes(&self) -> impl Iterator<Item = &DiffChange> {
        self.changes.iter().filter(|c| c.kind != ChangeKind::Unchanged)
    }

    /// Highest impact among all changes.
    #[must_use]
    pub fn max_impact(&self) -> Impact {
        self.changes.iter().map(|c| c.impact).max().unwrap_or(Impact::None)
    }
}

/// Format a [`DiffResult`] for human-readable display.
#[must_use]
pub fn format_diff(result: &DiffResult) -> String {
    let effective: Vec<&DiffChange> = result.effective_changes().collect();
    if effective.is_empty() {
        return "No changes since previous configuration.".to_string();
    }

    let mut lines = Vec::new();
    for change in effective {
        let sign = match change.kind {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Modified | ChangeKind::Unchanged => '~',
        };
        let mut line = format!("{sign} [{}] {}", impact_label(change.impact), change.path);
        if change.kind == ChangeKind::Modified {
            if let (Some(old), Some(new)) = (&change.old_value, &change.new_value) {
                let _ = write!(line, ": {old} -> {new}");
            }
        }
        lines.push(line);
    }

    let s = &result.summary;
    lines.push(format!(
        "{} added, {} removed, {} modified, {} unchanged ({} high, {} medium, {} low)",
        s.added, s.removed, s.modified, s.unchanged, s.high_impact, s.medium_impact, s.low_impact,
    ));
    lines.join("\n")
}

fn impact_label(impact: Impact) -> &'static str {
    match impact {
        Impact::High => "high",
        Impact::Medium => "medium",
        Impact::Low => "low",
        Impact::None => "none",
    }
}
