//! Graph store: keeps the previous execution graph between runs.
//!
//! The graph is written as YAML to a single state file. All I/O goes
//! through `ctx.fs`, so the store works with any filesystem adapter.

use std::path::{Path, PathBuf};

use crate::context::ServiceContext;
use crate::graph::ExecutionGraph;

/// Persistence for the graph the next run diffs against.
pub struct GraphStore<'a> {
    ctx: &'a ServiceContext,
    path: PathBuf,
}

impl<'a> GraphStore<'a> {
    /// Creates a store backed by the state file at `path`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, path: &Path) -> Self {
        Self { ctx, path: path.to_path_buf() }
    }

    /// Location of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previous graph. A missing state file means there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be read or parsed.
    pub fn load_previous(&self) -> Result<Option<ExecutionGraph>, String> {
        if !self.ctx.fs.exists(&self.path) {
            tracing::debug!(path = %self.path.display(), "no previous graph");
            return Ok(None);
        }
        let contents = self
            .ctx
            .fs
            .read_to_string(&self.path)
            .map_err(|e| format!("Failed to read graph state {}: {e}", self.path.display()))?;
        let graph: ExecutionGraph = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse graph state {}: {e}", self.path.display()))?;
        tracing::debug!(
            path = %self.path.display(),
            nodes = graph.nodes.len(),
            "loaded previous graph"
        );
        Ok(Some(graph))
    }

    /// Saves `graph` as the previous graph for the next run.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self, graph: &ExecutionGraph) -> Result<(), String> {
        let yaml = serde_yaml::to_string(graph)
            .map_err(|e| format!("Failed to serialize graph state: {e}"))?;
        self.ctx
            .fs
            .write(&self.path, &yaml)
            .map_err(|e| format!("Failed to write graph state {}: {e}", self.path.display()))
    }
}
