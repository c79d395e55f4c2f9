//! Replaying adapters that serve recorded interactions from a cassette.
//!
//! All adapters built from one cassette share a single replayer, so a
//! context replays a whole run from one file.

pub mod clock;
pub mod id_gen;
pub mod llm;

use std::sync::{Arc, Mutex};

use crate::cassette::CassetteReplayer;

pub use clock::ReplayingClock;
pub use id_gen::ReplayingIdGenerator;
pub use llm::ReplayingLlmClient;

/// Replayer handle shared by the adapters of one context.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Takes the output of the next `port`/`method` interaction.
///
/// # Panics
///
/// Panics if the lock is poisoned or the cassette has nothing left for the
/// pair.
fn next_output(replayer: &SharedReplayer, port: &str, method: &str) -> serde_json::Value {
    let mut guard = replayer.lock().unwrap_or_else(|_| panic!("{port} replayer lock poisoned"));
    guard.next_interaction(port, method).output
}
