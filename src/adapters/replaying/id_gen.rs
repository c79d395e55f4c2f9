//! Replaying adapter for the `IdGenerator` port.

use super::{next_output, SharedReplayer};
use crate::ports::IdGenerator;

/// Serves recorded run identifiers.
pub struct ReplayingIdGenerator {
    replayer: SharedReplayer,
}

impl ReplayingIdGenerator {
    /// Creates a replaying ID generator over a shared replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl IdGenerator for ReplayingIdGenerator {
    fn generate_id(&self) -> String {
        match next_output(&self.replayer, "id_gen", "generate_id") {
            serde_json::Value::String(id) => id,
            other => panic!("id_gen::generate_id: expected a string, recorded {other}"),
        }
    }
}
