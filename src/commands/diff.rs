//! `confrisk diff` command.

use std::path::Path;

use crate::ast;
use crate::context::ServiceContext;
use crate::diff::{self, format_diff, DiffResult};
use crate::graph::{self, ExecutionGraph, GraphOptions};

/// Execute the `diff` command: compare two configuration files.
///
/// # Errors
///
/// Returns an error string if either file cannot be read or parsed.
pub fn run(ctx: &ServiceContext, old: &Path, new: &Path, json: bool) -> Result<(), String> {
    let result = compare(ctx, old, new)?;
    if json {
        println!("{}", super::to_json(&result)?);
    } else {
        println!("{}", format_diff(&result));
    }
    Ok(())
}

fn compare(ctx: &ServiceContext, old: &Path, new: &Path) -> Result<DiffResult, String> {
    let previous = graph_of(ctx, old)?;
    let current = graph_of(ctx, new)?;
    Ok(diff::diff(Some(&previous), &current, ctx.clock.as_ref()))
}

fn graph_of(ctx: &ServiceContext, file: &Path) -> Result<ExecutionGraph, String> {
    let text = super::read_input(ctx, file)?;
    let document = ast::parse(&text, ctx.clock.as_ref())
        .map_err(|e| format!("{}: {e}", file.display()))?;
    Ok(graph::build(&document.ast, GraphOptions::default(), ctx.clock.as_ref()))
}
