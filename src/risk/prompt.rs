//! Prompt text for the risk and fix calls.

use std::fmt::Write as _;

use serde::Serialize;

use super::RiskReport;
use crate::diff::DiffResult;
use crate::graph::ExecutionGraph;

const RISK_SCHEMA: &str = r#"{
  "risks": [
    {
      "id": "risk_1",
      "severity": "critical|high|medium|low",
      "category": "security|performance|reliability|compatibility",
      "title": "Risk title",
      "description": "Detailed description",
      "affectedPaths": ["path1", "path2"],
      "recommendation": "Recommendation text"
    }
  ],
  "summary": {"critical": 0, "high": 0, "medium": 0, "low": 0, "total": 0},
  "overallRiskLevel": "critical|high|medium|low|safe"
}"#;

const FIX_SCHEMA: &str = r#"{
  "fixes": [
    {
      "id": "fix_1",
      "riskId": "risk_1",
      "title": "Fix title",
      "description": "Fix description",
      "patches": [
        {
          "path": "config.path.to.field",
          "operation": "replace|add|remove",
          "value": "new value",
          "description": "Patch description"
        }
      ],
      "confidence": 0.85,
      "autoApplicable": true
    }
  ],
  "summary": {"totalFixes": 0, "autoApplicable": 0, "manualReview": 0}
}"#;

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Builds the risk analysis prompt for a diff and the graph it was taken against.
#[must_use]
pub fn risk_prompt(diff: &DiffResult, graph: &ExecutionGraph) -> String {
    let mut prompt = String::from(
        "You are a configuration risk analyzer. Analyze the following configuration \
         changes and execution graph to identify potential risks.\n\n",
    );
    let _ = writeln!(prompt, "## Diff Result\n\n{}\n", pretty(diff));
    let _ = writeln!(prompt, "## Execution Graph\n\n{}\n", pretty(graph));
    let _ = writeln!(
        prompt,
        "## Instructions\n\nRespond with a risk analysis report in JSON:\n{RISK_SCHEMA}\n"
    );
    prompt.push_str(
        "Focus on:\n\
         1. Security vulnerabilities (exposed secrets, weak permissions)\n\
         2. Performance issues (resource limits, timeouts)\n\
         3. Reliability concerns (missing dependencies, broken references)\n\
         4. Compatibility problems (version mismatches, deprecated features)\n",
    );
    prompt
}

/// Builds the fix suggestion prompt for a risk report.
#[must_use]
pub fn fix_prompt(report: &RiskReport) -> String {
    let mut prompt = String::from(
        "You are a configuration fix suggestion generator. Based on the following risk \
         report, generate actionable fix suggestions.\n\n",
    );
    let _ = writeln!(prompt, "## Risk Report\n\n{}\n", pretty(report));
    let _ = writeln!(
        prompt,
        "## Instructions\n\nRespond with fix suggestions in JSON:\n{FIX_SCHEMA}\n"
    );
    prompt.push_str("Generate patches that can be directly applied to fix the identified risks.\n");
    prompt
}

/// Returns the payload inside a markdown code fence, or the trimmed text.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::FixedClock;
    use crate::ast;
    use crate::graph::{self, GraphOptions};

    #[test]
    fn risk_prompt_embeds_diff_graph_and_schema() {
        let clock = FixedClock::at("2025-01-01T00:00:00Z");
        let doc = ast::parse(r#"{"db": {"password": "p1"}}"#, &clock).unwrap();
        let g = graph::build(&doc.ast, GraphOptions::default(), &clock);
        let d = crate::diff::diff(None, &g, &clock);

        let prompt = risk_prompt(&d, &g);
        assert!(prompt.contains("configuration risk analyzer"));
        assert!(prompt.contains("\"path\": \"nodes.node_0\""));
        assert!(prompt.contains("\"executionOrder\": 2"));
        assert!(prompt.contains("\"overallRiskLevel\""));
    }

    #[test]
    fn fix_prompt_embeds_report() {
        let report = RiskReport::fallback(FixedClock::at("2025-01-01T00:00:00Z").0);
        let prompt = fix_prompt(&report);
        assert!(prompt.contains("\"overallRiskLevel\": \"safe\""));
        assert!(prompt.contains("\"autoApplicable\""));
    }

    #[test]
    fn strips_fences_with_and_without_language() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n[]\n```\n"), "[]");
        assert_eq!(strip_code_fence("  {\"b\": 2}  "), "{\"b\": 2}");
    }

    #[test]
    fn unterminated_fence_keeps_body() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }
}
