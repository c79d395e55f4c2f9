//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the analysis core and an
//! external system (time, filesystem, IDs, the AI risk service).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod llm;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use llm::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient, LlmError};
