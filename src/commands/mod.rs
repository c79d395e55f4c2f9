//! Command dispatch and handlers.

pub mod analyze;
pub mod diff;
pub mod graph;
pub mod parse;

use std::path::Path;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// Configuration comes from the environment (and `.env`). When
/// `CONFRISK_REPLAY` names a cassette, clock, ID, and AI interactions are
/// served from it.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let config = AppConfig::from_env()?;
    let ctx = ServiceContext::from_config(&config)?;
    dispatch_with_context(command, &ctx, &config)
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config: &AppConfig,
) -> Result<(), String> {
    match command {
        Command::Parse { file } => parse::run(ctx, file),
        Command::Graph { file, no_self_references } => graph::run(ctx, file, *no_self_references),
        Command::Diff { old, new, json } => diff::run(ctx, old, new, *json),
        Command::Analyze { file, state, no_ai, json, no_save } => {
            let options = analyze::AnalyzeOptions {
                state: state.clone().unwrap_or_else(|| config.state_path.clone()),
                with_ai: !*no_ai,
                json: *json,
                save: !*no_save,
            };
            analyze::run(ctx, config, file, &options)
        }
    }
}

/// Reads a configuration file through the filesystem port.
fn read_input(ctx: &ServiceContext, path: &Path) -> Result<String, String> {
    ctx.fs.read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))
}

/// Pretty JSON for command output.
fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize output: {e}"))
}
