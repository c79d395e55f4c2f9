//! Calls the AI service and turns its answers into reports.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::prompt::{fix_prompt, risk_prompt, strip_code_fence};
use super::{
    AiCallKind, AiCallLog, AiCallOutcome, AiCallRequest, Fix, FixMetadata, FixSuggestion,
    FixSummary, OverallRiskLevel, ReportSource, RiskItem, RiskMetadata, RiskReport, RiskSummary,
};
use crate::config::AiConfig;
use crate::diff::DiffResult;
use crate::graph::ExecutionGraph;
use crate::ports::{Clock, CompletionRequest, LlmClient};

/// Risk report as the service returns it, before bookkeeping is attached.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RiskPayload {
    #[serde(default)]
    risks: Vec<RiskItem>,
    #[serde(default)]
    summary: RiskSummary,
    overall_risk_level: OverallRiskLevel,
}

#[derive(Deserialize)]
struct FixPayload {
    #[serde(default)]
    fixes: Vec<Fix>,
    #[serde(default)]
    summary: FixSummary,
}

/// Outcome of one round trip to the service.
struct Exchange<T> {
    payload: Option<T>,
    log: AiCallLog,
    finished_at: DateTime<Utc>,
}

/// Client for the risk and fix collaborator.
///
/// Failures never escape: a transport error or an unusable answer yields the
/// fallback payload, a `warn!` event, and an error entry in the call log.
pub struct RiskService<'a> {
    llm: &'a dyn LlmClient,
    clock: &'a dyn Clock,
    config: &'a AiConfig,
}

impl<'a> RiskService<'a> {
    /// Creates a service over an LLM client and a clock.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient, clock: &'a dyn Clock, config: &'a AiConfig) -> Self {
        Self { llm, clock, config }
    }

    /// Asks the service to assess the risk of `diff` against `graph`.
    pub async fn analyze_risk(
        &self,
        diff: &DiffResult,
        graph: &ExecutionGraph,
    ) -> (RiskReport, AiCallLog) {
        let prompt = risk_prompt(diff, graph);
        let exchange = self.exchange::<RiskPayload>(AiCallKind::RiskAnalysis, prompt).await;

        let report = match exchange.payload {
            Some(payload) => RiskReport {
                risks: payload.risks,
                summary: payload.summary,
                overall_risk_level: payload.overall_risk_level,
                metadata: RiskMetadata {
                    analyzed_at: exchange.finished_at,
                    analysis_duration_ms: exchange.log.duration_ms,
                    source: ReportSource::Service,
                },
            },
            None => RiskReport::fallback(exchange.finished_at),
        };
        (report, exchange.log)
    }

    /// Asks the service for fixes addressing `report`.
    pub async fn suggest_fixes(&self, report: &RiskReport) -> (FixSuggestion, AiCallLog) {
        let prompt = fix_prompt(report);
        let exchange = self.exchange::<FixPayload>(AiCallKind::FixSuggestion, prompt).await;

        let suggestion = match exchange.payload {
            Some(payload) => FixSuggestion {
                fixes: payload.fixes,
                summary: payload.summary,
                metadata: FixMetadata {
                    generated_at: exchange.finished_at,
                    source: ReportSource::Service,
                },
            },
            None => FixSuggestion::fallback(exchange.finished_at),
        };
        (suggestion, exchange.log)
    }

    async fn exchange<T: DeserializeOwned>(&self, call: AiCallKind, prompt: String) -> Exchange<T> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            prompt,
        };
        let summary = AiCallRequest {
            url: self.llm.endpoint(),
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            prompt_chars: request.prompt.chars().count(),
        };

        let started_at = self.clock.now();
        tracing::debug!(
            ?call,
            url = %summary.url,
            prompt_chars = summary.prompt_chars,
            "calling AI service"
        );
        let response = self.llm.complete(&request).await;
        let finished_at = self.clock.now();

        let result = response
            .map_err(|e| format!("AI service call failed: {e}"))
            .and_then(|response| {
                serde_json::from_str::<T>(strip_code_fence(&response.text))
                    .map(|payload| (payload, response.text.chars().count()))
                    .map_err(|e| format!("AI service returned an unusable payload: {e}"))
            });

        let (payload, outcome) = match result {
            Ok((payload, response_chars)) => (Some(payload), AiCallOutcome::Ok { response_chars }),
            Err(message) => {
                tracing::warn!(?call, %message, "falling back to an empty result");
                (None, AiCallOutcome::Error { message })
            }
        };

        let duration_ms = u64::try_from((finished_at - started_at).num_milliseconds()).unwrap_or(0);
        let log = AiCallLog { timestamp: started_at, call, request: summary, outcome, duration_ms };
        Exchange { payload, log, finished_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::FixedClock;
    use crate::adapters::replaying::ReplayingLlmClient;
    use crate::ast;
    use crate::cassette::{Cassette, CassetteReplayer, Interaction};
    use crate::graph::{self, GraphOptions};
    use crate::risk::{PatchOperation, Severity};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn llm_with(outputs: Vec<Value>) -> ReplayingLlmClient {
        let interactions = outputs
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
        let cassette = Cassette { name: "risk".into(), recorded_at: Utc::now(), interactions };
        ReplayingLlmClient::new(Arc::new(Mutex::new(CassetteReplayer::new(&cassette))))
    }

    fn ok_text(text: &str) -> Value {
        json!({"ok": {"text": text}})
    }

    fn sample() -> (DiffResult, ExecutionGraph) {
        let clock = FixedClock::at("2025-01-01T00:00:00Z");
        let old = ast::parse(r#"{"db": {"password": "p1"}}"#, &clock).unwrap();
        let new = ast::parse(r#"{"db": {"password": "p2"}}"#, &clock).unwrap();
        let old_graph = graph::build(&old.ast, GraphOptions::default(), &clock);
        let new_graph = graph::build(&new.ast, GraphOptions::default(), &clock);
        let diff = crate::diff::diff(Some(&old_graph), &new_graph, &clock);
        (diff, new_graph)
    }

    const RISK_JSON: &str = r#"{
        "risks": [{
            "id": "risk_1",
            "severity": "high",
            "category": "security",
            "title": "Plaintext password changed",
            "description": "The database password is stored inline.",
            "affectedPaths": ["nodes.node_1.properties.password"],
            "recommendation": "Use a secret reference."
        }],
        "summary": {"critical": 0, "high": 1, "medium": 0, "low": 0, "total": 1},
        "overallRiskLevel": "high"
    }"#;

    #[tokio::test]
    async fn analyze_risk_keeps_service_payload() {
        let llm = llm_with(vec![ok_text(RISK_JSON)]);
        let clock = FixedClock::at("2025-02-02T12:00:00Z");
        let config = AiConfig::default();
        let service = RiskService::new(&llm, &clock, &config);
        let (diff, graph) = sample();

        let (report, log) = service.analyze_risk(&diff, &graph).await;

        assert_eq!(report.risks.len(), 1);
        assert_eq!(report.risks[0].severity, Severity::High);
        assert_eq!(report.summary.total, 1);
        assert_eq!(report.overall_risk_level, OverallRiskLevel::High);
        assert_eq!(report.metadata.source, ReportSource::Service);
        assert_eq!(report.metadata.analyzed_at, clock.0);

        assert_eq!(log.call, AiCallKind::RiskAnalysis);
        assert!(log.succeeded());
        assert_eq!(log.request.url, "cassette");
        assert_eq!(log.request.model, config.model);
        assert!(log.request.prompt_chars > 0);
        assert_eq!(log.duration_ms, 0);
    }

    #[tokio::test]
    async fn fenced_response_is_accepted() {
        let llm = llm_with(vec![ok_text(&format!("```json\n{RISK_JSON}\n```"))]);
        let clock = FixedClock::at("2025-02-02T12:00:00Z");
        let config = AiConfig::default();
        let (diff, graph) = sample();

        let (report, _) = RiskService::new(&llm, &clock, &config).analyze_risk(&diff, &graph).await;
        assert_eq!(report.metadata.source, ReportSource::Service);
        assert_eq!(report.risks[0].id, "risk_1");
    }

    #[tokio::test]
    async fn transport_error_falls_back_to_safe_report() {
        let llm = llm_with(vec![json!({"err": "connection refused"})]);
        let clock = FixedClock::at("2025-02-02T12:00:00Z");
        let config = AiConfig::default();
        let (diff, graph) = sample();

        let service = RiskService::new(&llm, &clock, &config);
        let (report, log) = service.analyze_risk(&diff, &graph).await;

        assert!(report.risks.is_empty());
        assert_eq!(report.overall_risk_level, OverallRiskLevel::Safe);
        assert_eq!(report.metadata.source, ReportSource::Fallback);
        match log.outcome {
            AiCallOutcome::Error { message } => assert!(message.contains("connection refused")),
            AiCallOutcome::Ok { .. } => panic!("expected an error outcome"),
        }
    }

    #[tokio::test]
    async fn unparsable_response_falls_back() {
        let llm = llm_with(vec![ok_text("I could not analyze this configuration.")]);
        let clock = FixedClock::at("2025-02-02T12:00:00Z");
        let config = AiConfig::default();
        let (diff, graph) = sample();

        let service = RiskService::new(&llm, &clock, &config);
        let (report, log) = service.analyze_risk(&diff, &graph).await;

        assert_eq!(report, RiskReport::fallback(clock.0));
        assert!(!log.succeeded());
    }

    #[tokio::test]
    async fn suggest_fixes_keeps_service_payload() {
        let fixes = json!({
            "fixes": [{
                "id": "fix_1",
                "riskId": "risk_1",
                "title": "Reference a secret",
                "description": "Move the password to the secret store.",
                "patches": [{
                    "path": "nodes.node_1.properties.password",
                    "operation": "replace",
                    "value": "${DB_PASSWORD}",
                    "description": "Replace plaintext password"
                }],
                "confidence": 0.9,
                "autoApplicable": true
            }],
            "summary": {"totalFixes": 1, "autoApplicable": 1, "manualReview": 0}
        });
        let llm = llm_with(vec![ok_text(&fixes.to_string())]);
        let clock = FixedClock::at("2025-02-02T12:00:00Z");
        let config = AiConfig::default();
        let report = RiskReport::fallback(clock.0);

        let service = RiskService::new(&llm, &clock, &config);
        let (suggestion, log) = service.suggest_fixes(&report).await;

        assert_eq!(suggestion.fixes.len(), 1);
        assert_eq!(suggestion.fixes[0].patches[0].operation, PatchOperation::Replace);
        assert_eq!(suggestion.summary.auto_applicable, 1);
        assert_eq!(suggestion.metadata.source, ReportSource::Service);
        assert_eq!(log.call, AiCallKind::FixSuggestion);
    }

    #[tokio::test]
    async fn suggest_fixes_falls_back_on_wrong_shape() {
        let llm = llm_with(vec![ok_text(r#"{"fixes": "none"}"#)]);
        let clock = FixedClock::at("2025-02-02T12:00:00Z");
        let config = AiConfig::default();
        let report = RiskReport::fallback(clock.0);

        let service = RiskService::new(&llm, &clock, &config);
        let (suggestion, log) = service.suggest_fixes(&report).await;

        assert_eq!(suggestion, FixSuggestion::fallback(clock.0));
        assert!(!log.succeeded());
    }
}
