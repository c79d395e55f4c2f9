//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `confrisk`.
#[derive(Debug, Parser)]
#[command(name = "confrisk", version, about = "Semantic diff and risk analysis for configuration")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the labeled tree of a JSON or YAML file.
    Parse {
        /// Configuration file.
        file: PathBuf,
    },
    /// Print the execution graph inferred from a file.
    Graph {
        /// Configuration file.
        file: PathBuf,
        /// Drop dependency edges from a node to itself.
        #[arg(long)]
        no_self_references: bool,
    },
    /// Semantic diff between two configuration files.
    Diff {
        /// Previous version.
        old: PathBuf,
        /// Current version.
        new: PathBuf,
        /// Print the diff result as JSON instead of a report.
        #[arg(long)]
        json: bool,
    },
    /// Run the full pipeline against the stored previous graph.
    Analyze {
        /// Configuration file.
        file: PathBuf,
        /// State file holding the previous graph (overrides `CONFRISK_STATE`).
        #[arg(long)]
        state: Option<PathBuf>,
        /// Skip the AI risk and fix calls.
        #[arg(long)]
        no_ai: bool,
        /// Print the whole run as JSON.
        #[arg(long)]
        json: bool,
        /// Do not store this run's graph as the new previous graph.
        #[arg(long)]
        no_save: bool,
    },
}
