//! `confrisk analyze` command.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::context::ServiceContext;
use crate::diff::format_diff;
use crate::pipeline::{Pipeline, PipelineOptions, PipelineRun};
use crate::risk::ReportSource;
use crate::store::GraphStore;

/// Flags of one `analyze` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// State file with the previous graph.
    pub state: PathBuf,
    /// Whether to call the AI service.
    pub with_ai: bool,
    /// Print the whole run as JSON.
    pub json: bool,
    /// Store this run's graph for the next run.
    pub save: bool,
}

/// Execute the `analyze` command.
///
/// Loads the previous graph, runs the pipeline on `file`, prints the result,
/// and stores the new graph unless told not to.
///
/// # Errors
///
/// Returns an error string if the input cannot be read or parsed, or the
/// graph state cannot be loaded or saved.
pub fn run(
    ctx: &ServiceContext,
    config: &AppConfig,
    file: &Path,
    options: &AnalyzeOptions,
) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    let output = runtime.block_on(analyze(ctx, config, file, options))?;
    println!("{output}");
    Ok(())
}

async fn analyze(
    ctx: &ServiceContext,
    config: &AppConfig,
    file: &Path,
    options: &AnalyzeOptions,
) -> Result<String, String> {
    let text = super::read_input(ctx, file)?;
    let store = GraphStore::new(ctx, &options.state);
    let previous = store.load_previous()?;

    let pipeline = Pipeline::new(ctx, &config.ai)
        .with_options(PipelineOptions { with_ai: options.with_ai, ..PipelineOptions::default() });
    let run = pipeline.run(&text, previous.as_ref()).await.map_err(|e| e.to_string())?;

    if options.save {
        store.save(&run.graph)?;
    }

    if options.json {
        super::to_json(&run)
    } else {
        Ok(report(&run))
    }
}

fn report(run: &PipelineRun) -> String {
    let meta = &run.graph.metadata;
    let mut out = format!(
        "Run {}: {} nodes, {} edges ({})\n\n",
        run.run_id, meta.node_count, meta.edge_count, run.document.metadata.format
    );
    out.push_str(&format_diff(&run.diff));

    if let Some(risk) = &run.risk_report {
        let _ = write!(
            out,
            "\n\nRisk level: {} ({} risks)",
            label(risk.overall_risk_level),
            risk.summary.total
        );
        if risk.metadata.source == ReportSource::Fallback {
            out.push_str(" [AI service unavailable]");
        }
        for item in &risk.risks {
            let _ = write!(
                out,
                "\n  {} [{}/{}] {}",
                item.id,
                label(item.severity),
                label(item.category),
                item.title
            );
        }
    }
    if let Some(fixes) = &run.fix_suggestion {
        let _ = write!(
            out,
            "\n\nFixes: {} ({} auto-applicable)",
            fixes.summary.total_fixes, fixes.summary.auto_applicable
        );
        for fix in &fixes.fixes {
            let _ = write!(out, "\n  {} -> {}: {}", fix.id, fix.risk_id, fix.title);
        }
    }
    out
}

fn label(value: impl std::fmt::Debug) -> String {
    format!("{value:?}").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(dir: &Path) -> AnalyzeOptions {
        AnalyzeOptions { state: dir.join("state.yaml"), with_ai: false, json: false, save: true }
    }

    #[tokio::test]
    async fn second_run_diffs_against_saved_graph() {
        let dir = std::env::temp_dir().join("confrisk_cmd_analyze");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("app.yaml");
        let config = AppConfig::default();
        let ctx = ServiceContext::live(&config).unwrap();

        std::fs::write(&file, "db:\n  password: p1\n").unwrap();
        let first = analyze(&ctx, &config, &file, &options(&dir)).await.unwrap();
        assert!(first.contains("3 added"));
        assert!(dir.join("state.yaml").exists());

        std::fs::write(&file, "db:\n  password: p2\n").unwrap();
        let second = analyze(&ctx, &config, &file, &options(&dir)).await.unwrap();
        assert!(second.contains("~ [high] nodes.node_1.properties.password"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn no_save_leaves_state_untouched() {
        let dir = std::env::temp_dir().join("confrisk_cmd_analyze_nosave");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("app.json");
        std::fs::write(&file, r#"{"retries": 3}"#).unwrap();
        let config = AppConfig::default();
        let ctx = ServiceContext::live(&config).unwrap();

        let opts = AnalyzeOptions { save: false, json: true, ..options(&dir) };
        let out = analyze(&ctx, &config, &file, &opts).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["diff"]["summary"]["added"], 2);
        assert!(!dir.join("state.yaml").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
