//! `confrisk parse` command.

use std::path::Path;

use crate::ast;
use crate::context::ServiceContext;

/// Execute the `parse` command: print the labeled tree as JSON.
///
/// # Errors
///
/// Returns an error string if the file cannot be read or parsed.
pub fn run(ctx: &ServiceContext, file: &Path) -> Result<(), String> {
    println!("{}", render(ctx, file)?);
    Ok(())
}

fn render(ctx: &ServiceContext, file: &Path) -> Result<String, String> {
    let text = super::read_input(ctx, file)?;
    let document = ast::parse(&text, ctx.clock.as_ref()).map_err(|e| e.to_string())?;
    super::to_json(&document)
}
