//! Runs the full analysis: parse, graph, diff, and the AI collaborator.

use serde::Serialize;

use crate::ast::{self, ParsedDocument};
use crate::config::AiConfig;
use crate::context::ServiceContext;
use crate::diff::{self, DiffResult};
use crate::error::ParseError;
use crate::graph::{self, ExecutionGraph, GraphOptions};
use crate::risk::{AiCallLog, FixSuggestion, RiskReport, RiskService};

/// Switches for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Graph inference settings.
    pub graph: GraphOptions,
    /// Whether to call the AI service after diffing.
    pub with_ai: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { graph: GraphOptions::default(), with_ai: true }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    /// Identifier of this run.
    pub run_id: String,
    /// Parsed input.
    pub document: ParsedDocument,
    /// Execution graph of the input. Becomes the next run's previous graph.
    pub graph: ExecutionGraph,
    /// Changes relative to the previous graph.
    pub diff: DiffResult,
    /// AI risk assessment, when the AI stage ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_report: Option<RiskReport>,
    /// AI fix suggestions, when the AI stage ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<FixSuggestion>,
    /// One entry per AI call, in call order.
    pub ai_calls: Vec<AiCallLog>,
}

/// Pipeline over a service context.
pub struct Pipeline<'a> {
    ctx: &'a ServiceContext,
    ai: &'a AiConfig,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline with default options.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, ai: &'a AiConfig) -> Self {
        Self { ctx, ai, options: PipelineOptions::default() }
    }

    /// Replaces the run options.
    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Analyzes `text` against the `previous` graph.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the text is empty or malformed. Nothing
    /// downstream of the parser runs in that case. AI failures are not
    /// errors; they show up as fallback reports and in `ai_calls`.
    pub async fn run(
        &self,
        text: &str,
        previous: Option<&ExecutionGraph>,
    ) -> Result<PipelineRun, ParseError> {
        let clock = self.ctx.clock.as_ref();
        let document = ast::parse(text, clock)?;
        let run_id = self.ctx.id_gen.generate_id();

        let graph = graph::build(&document.ast, self.options.graph, clock);
        let diff = diff::diff(previous, &graph, clock);

        let mut ai_calls = Vec::new();
        let (risk_report, fix_suggestion) = if self.options.with_ai {
            let service = RiskService::new(self.ctx.llm.as_ref(), clock, self.ai);
            let (report, log) = service.analyze_risk(&diff, &graph).await;
            ai_calls.push(log);
            let (fixes, log) = service.suggest_fixes(&report).await;
            ai_calls.push(log);
            (Some(report), Some(fixes))
        } else {
            (None, None)
        };

        tracing::info!(
            %run_id,
            nodes = graph.metadata.node_count,
            edges = graph.metadata.edge_count,
            changes = diff.effective_changes().count(),
            max_impact = ?diff.max_impact(),
            ai_calls = ai_calls.len(),
            "pipeline run complete"
        );

        Ok(PipelineRun { run_id, document, graph, diff, risk_report, fix_suggestion, ai_calls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::{FixedClock, FixedIdGenerator};
    use crate::adapters::live::filesystem::LiveFileSystem;
    use crate::adapters::replaying::ReplayingLlmClient;
    use crate::cassette::{Cassette, CassetteReplayer, Interaction};
    use crate::diff::{ChangeKind, Impact};
    use crate::risk::ReportSource;
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn context(llm_outputs: Vec<Value>) -> ServiceContext {
        let interactions = llm_outputs
            .into_iter()
            .enumerate()
            .map(|(i, output)| Interaction {
                seq: i as u64,
                port: "llm".into(),
                method: "complete".into(),
                input: json!({}),
                output,
            })
            .collect();
        let cassette = Cassette { name: "pipeline".into(), recorded_at: Utc::now(), interactions };
        ServiceContext {
            clock: Box::new(FixedClock::at("2025-04-01T09:00:00Z")),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(FixedIdGenerator("run-1".into())),
            llm: Box::new(ReplayingLlmClient::new(Arc::new(Mutex::new(CassetteReplayer::new(
                &cassette,
            ))))),
        }
    }

    fn offline() -> PipelineOptions {
        PipelineOptions { with_ai: false, ..PipelineOptions::default() }
    }

    #[tokio::test]
    async fn first_run_reports_every_node_added() {
        let ctx = context(vec![]);
        let ai = AiConfig::default();
        let pipeline = Pipeline::new(&ctx, &ai).with_options(offline());

        let run = pipeline.run("a: 1\nb: 2\n", None).await.unwrap();

        assert_eq!(run.run_id, "run-1");
        assert_eq!(run.graph.nodes.len(), 3);
        assert_eq!(run.diff.summary.added, 3);
        assert!(run.diff.changes.iter().all(|c| !c.path.starts_with("edge:")));
        assert!(run.risk_report.is_none());
        assert!(run.ai_calls.is_empty());
    }

    #[tokio::test]
    async fn password_change_is_high_impact() {
        let ctx = context(vec![]);
        let ai = AiConfig::default();
        let pipeline = Pipeline::new(&ctx, &ai).with_options(offline());

        let first = pipeline.run(r#"{"db": {"password": "p1"}}"#, None).await.unwrap();
        let second =
            pipeline.run(r#"{"db": {"password": "p2"}}"#, Some(&first.graph)).await.unwrap();

        let effective: Vec<_> = second.diff.effective_changes().collect();
        assert_eq!(effective.len(), 1);
        assert_eq!(effective[0].kind, ChangeKind::Modified);
        assert!(effective[0].path.ends_with(".properties.password"));
        assert_eq!(effective[0].impact, Impact::High);
    }

    #[tokio::test]
    async fn malformed_input_produces_no_graph() {
        let ctx = context(vec![]);
        let ai = AiConfig::default();
        let pipeline = Pipeline::new(&ctx, &ai);

        let err = pipeline.run("{ not json", None).await.unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));

        let err = pipeline.run("   \n", None).await.unwrap_err();
        assert_eq!(err, ParseError::EmptyInput);
    }

    #[tokio::test]
    async fn ai_stage_logs_both_calls() {
        let ctx = context(vec![
            json!({"ok": {"text": "{\"risks\": [], \"overallRiskLevel\": \"low\"}"}}),
            json!({"err": "service unavailable"}),
        ]);
        let ai = AiConfig::default();
        let pipeline = Pipeline::new(&ctx, &ai);

        let run = pipeline.run("service:\n  port: 8080\n", None).await.unwrap();

        let report = run.risk_report.unwrap();
        assert_eq!(report.metadata.source, ReportSource::Service);
        let fixes = run.fix_suggestion.unwrap();
        assert_eq!(fixes.metadata.source, ReportSource::Fallback);
        assert_eq!(run.ai_calls.len(), 2);
        assert!(run.ai_calls[0].succeeded());
        assert!(!run.ai_calls[1].succeeded());
    }

    #[tokio::test]
    async fn run_serializes_camel_case() {
        let ctx = context(vec![]);
        let ai = AiConfig::default();
        let pipeline = Pipeline::new(&ctx, &ai).with_options(offline());
        let run = pipeline.run("x: 1", None).await.unwrap();

        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["runId"], "run-1");
        assert_eq!(json["document"]["metadata"]["format"], "yaml");
        assert!(json.get("riskReport").is_none());
        assert_eq!(json["aiCalls"], json!([]));
    }
}
