//! `confrisk graph` command.

use std::path::Path;

use crate::ast;
use crate::context::ServiceContext;
use crate::graph::{self, GraphOptions};

/// Execute the `graph` command: print the execution graph as JSON.
///
/// # Errors
///
/// Returns an error string if the file cannot be read or parsed.
pub fn run(ctx: &ServiceContext, file: &Path, no_self_references: bool) -> Result<(), String> {
    let options = GraphOptions { allow_self_references: !no_self_references };
    println!("{}", render(ctx, file, options)?);
    Ok(())
}

fn render(ctx: &ServiceContext, file: &Path, options: GraphOptions) -> Result<String, String> {
    let text = super::read_input(ctx, file)?;
    let document = ast::parse(&text, ctx.clock.as_ref()).map_err(|e| e.to_string())?;
    let graph = graph::build(&document.ast, options, ctx.clock.as_ref());
    super::to_json(&graph)
}
