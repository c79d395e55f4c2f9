//! Semantic diff and risk analysis for JSON and YAML configuration.
//!
//! Configuration text flows through a fixed pipeline: [`ast`] turns it into
//! a labeled tree, [`graph`] infers an execution model, [`diff`] compares
//! that model with the previous run's, and [`risk`] asks an external AI
//! service to assess the changes. [`pipeline`] strings the stages together.

pub mod adapters;
pub mod ast;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod ports;
pub mod risk;
pub mod store;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["confrisk", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_reports_missing_input_file() {
        let err = run(["confrisk", "parse", "/nonexistent/confrisk/input.yaml"]).unwrap_err();
        assert!(err.contains("Failed to read"));
    }
}
