//! Replaying adapter for the `LlmClient` port.
//!
//! Recorded outputs use `{"ok": <CompletionResponse>}` for successful calls
//! and `{"err": "<message>"}` for failed ones.

use serde_json::Value;

use super::{next_output, SharedReplayer};
use crate::ports::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient, LlmError};

/// Serves recorded completions.
pub struct ReplayingLlmClient {
    replayer: SharedReplayer,
}

impl ReplayingLlmClient {
    /// Creates a replaying LLM client over a shared replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl LlmClient for ReplayingLlmClient {
    fn endpoint(&self) -> String {
        "cassette".to_string()
    }

    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        let output = next_output(&self.replayer, "llm", "complete");
        Box::pin(async move { replay_result(output) })
    }
}

fn replay_result(output: Value) -> Result<CompletionResponse, LlmError> {
    match output {
        Value::Object(mut map) => {
            if let Some(err) = map.remove("err") {
                let message = err.as_str().map_or_else(|| err.to_string(), String::from);
                return Err(message.into());
            }
            let ok = map
                .remove("ok")
                .unwrap_or_else(|| panic!("llm::complete: recording lacks an ok/err key"));
            serde_json::from_value(ok).map_err(|e| -> LlmError {
                format!("recorded completion is malformed: {e}").into()
            })
        }
        other => panic!("llm::complete: expected an object, recorded {other}"),
    }
}
