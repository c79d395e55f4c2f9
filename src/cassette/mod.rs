//! Cassettes: recorded port interactions replayed for deterministic runs.

pub mod format;
pub mod replayer;

pub use format::{Cassette, Interaction};
pub use replayer::CassetteReplayer;
