//! Risk scoring and fix suggestions from the external AI service.
//!
//! The analysis core never interprets these payloads. It forwards the diff
//! and graph, keeps whatever the service returns, and substitutes an empty
//! report when the service is unreachable or answers with garbage.

pub mod prompt;
pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use service::RiskService;

/// Severity of a single risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed before rollout.
    Critical,
    /// Serious.
    High,
    /// Worth reviewing.
    Medium,
    /// Informational.
    Low,
}

/// Area a risk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    /// Exposed secrets, weak permissions.
    Security,
    /// Resource limits, timeouts.
    Performance,
    /// Missing dependencies, broken references.
    Reliability,
    /// Version mismatches, deprecated features.
    Compatibility,
}

/// Overall verdict for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallRiskLevel {
    /// At least one critical risk.
    Critical,
    /// High.
    High,
    /// Medium.
    Medium,
    /// Low.
    Low,
    /// Nothing to worry about.
    Safe,
}

/// Where a report or suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    /// Returned by the AI service.
    Service,
    /// Substituted after the service failed.
    Fallback,
}

/// One risk identified by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    /// Identifier referenced by fixes, e.g. `risk_1`.
    pub id: String,
    /// Severity.
    pub severity: Severity,
    /// Category.
    pub category: RiskCategory,
    /// Short title.
    pub title: String,
    /// Details.
    #[serde(default)]
    pub description: String,
    /// Diff paths the risk concerns.
    #[serde(default)]
    pub affected_paths: Vec<String>,
    /// Suggested remedy.
    #[serde(default)]
    pub recommendation: String,
}

/// Per-severity risk counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Critical risks.
    pub critical: usize,
    /// High risks.
    pub high: usize,
    /// Medium risks.
    pub medium: usize,
    /// Low risks.
    pub low: usize,
    /// All risks.
    pub total: usize,
}

/// Report bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetadata {
    /// When the analysis finished.
    pub analyzed_at: DateTime<Utc>,
    /// Time spent waiting for the service.
    pub analysis_duration_ms: u64,
    /// Service or fallback.
    pub source: ReportSource,
}

/// Risk assessment of a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// Identified risks.
    pub risks: Vec<RiskItem>,
    /// Counts.
    pub summary: RiskSummary,
    /// Verdict.
    pub overall_risk_level: OverallRiskLevel,
    /// Bookkeeping.
    pub metadata: RiskMetadata,
}

impl RiskReport {
    /// The empty report used when the service cannot be used.
    #[must_use]
    pub fn fallback(analyzed_at: DateTime<Utc>) -> Self {
        Self {
            risks: Vec::new(),
            summary: RiskSummary::default(),
            overall_risk_level: OverallRiskLevel::Safe,
            metadata: RiskMetadata {
                analyzed_at,
                analysis_duration_ms: 0,
                source: ReportSource::Fallback,
            },
        }
    }
}

/// Kind of edit a patch performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    /// Overwrite an existing value.
    Replace,
    /// Insert a new value.
    Add,
    /// Delete a value.
    Remove,
}

/// A single proposed edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixPatch {
    /// Target path.
    pub path: String,
    /// Edit kind.
    pub operation: PatchOperation,
    /// New value for `replace` and `add`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// What the patch does.
    #[serde(default)]
    pub description: String,
}

/// A fix addressing one risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    /// Identifier, e.g. `fix_1`.
    pub id: String,
    /// Risk this fix addresses.
    pub risk_id: String,
    /// Short title.
    pub title: String,
    /// Details.
    #[serde(default)]
    pub description: String,
    /// Edits making up the fix.
    #[serde(default)]
    pub patches: Vec<FixPatch>,
    /// Service confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Whether the patches can be applied without review.
    #[serde(default)]
    pub auto_applicable: bool,
}

/// Fix counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixSummary {
    /// All fixes.
    pub total_fixes: usize,
    /// Fixes marked auto-applicable.
    pub auto_applicable: usize,
    /// Fixes needing a human.
    pub manual_review: usize,
}

/// Suggestion bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixMetadata {
    /// When the suggestion was produced.
    pub generated_at: DateTime<Utc>,
    /// Service or fallback.
    pub source: ReportSource,
}

/// Fixes proposed for a risk report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixSuggestion {
    /// Proposed fixes.
    pub fixes: Vec<Fix>,
    /// Counts.
    pub summary: FixSummary,
    /// Bookkeeping.
    pub metadata: FixMetadata,
}

impl FixSuggestion {
    /// The empty suggestion used when the service cannot be used.
    #[must_use]
    pub fn fallback(generated_at: DateTime<Utc>) -> Self {
        Self {
            fixes: Vec::new(),
            summary: FixSummary::default(),
            metadata: FixMetadata { generated_at, source: ReportSource::Fallback },
        }
    }
}

/// Which collaborator call a log entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiCallKind {
    /// `analyze_risk`.
    RiskAnalysis,
    /// `suggest_fixes`.
    FixSuggestion,
}

/// What was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCallRequest {
    /// Endpoint the request went to.
    pub url: String,
    /// Model identifier.
    pub model: String,
    /// Completion budget.
    pub max_tokens: u32,
    /// Prompt length in characters.
    pub prompt_chars: usize,
}

/// How a call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiCallOutcome {
    /// The service answered with a usable payload.
    Ok {
        /// Length of the response text.
        #[serde(rename = "responseChars")]
        response_chars: usize,
    },
    /// Transport failure or unusable payload.
    Error {
        /// Failure description.
        message: String,
    },
}

/// One entry of the AI call log carried on a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCallLog {
    /// When the call started.
    pub timestamp: DateTime<Utc>,
    /// Which call.
    pub call: AiCallKind,
    /// Request summary.
    pub request: AiCallRequest,
    /// Result.
    pub outcome: AiCallOutcome,
    /// Wall time between start and finish, per the clock port.
    pub duration_ms: u64,
}

impl AiCallLog {
    /// Whether the call produced a usable payload.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AiCallOutcome::Ok { .. })
    }
}
