//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded interaction with a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the recording, starting at zero.
    pub seq: u64,
    /// Port name (`clock`, `id_gen`, `llm`).
    pub port: String,
    /// Method invoked on the port.
    pub method: String,
    /// Arguments passed to the port.
    #[serde(default)]
    pub input: serde_json::Value,
    /// Value returned by the port. Fallible methods use `{"ok": ..}` / `{"err": ".."}`.
    pub output: serde_json::Value,
}

/// A named, timestamped sequence of interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name.
    pub name: String,
    /// When the cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Interactions in recording order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Parses a cassette from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error string if the YAML does not describe a cassette.
    pub fn from_yaml(text: &str) -> Result<Self, String> {
        serde_yaml::from_str(text).map_err(|e| format!("failed to parse cassette: {e}"))
    }
}
