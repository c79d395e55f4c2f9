//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::adapters::live::llm::LiveLlmClient;
use crate::adapters::replaying::{ReplayingClock, ReplayingIdGenerator, ReplayingLlmClient};
use crate::cassette::{Cassette, CassetteReplayer};
use crate::config::AppConfig;
use crate::ports::{Clock, FileSystem, IdGenerator, LlmClient};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors wire
/// up live or replaying adapters; tests may also assemble one by hand.
pub struct ServiceContext {
    /// Clock stamping every stage's output.
    pub clock: Box<dyn Clock>,
    /// Filesystem for configuration input and graph state.
    pub fs: Box<dyn FileSystem>,
    /// Run identifier source.
    pub id_gen: Box<dyn IdGenerator>,
    /// AI risk and fix service.
    pub llm: Box<dyn LlmClient>,
}

impl ServiceContext {
    /// Creates a context from configuration: replaying when
    /// `CONFRISK_REPLAY` names a cassette, live otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be loaded or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        match &config.replay {
            Some(path) => Self::replaying(path),
            None => Self::live(config),
        }
    }

    /// Creates a live context talking to the real clock, disk, and AI service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn live(config: &AppConfig) -> Result<Self, String> {
        Ok(Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
            llm: Box::new(LiveLlmClient::new(&config.ai)?),
        })
    }

    /// Creates a context replaying clock, ID, and AI interactions from a
    /// cassette file. The filesystem stays live so real inputs can be read.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette = Cassette::from_yaml(&content)
            .map_err(|e| format!("{e} (in {})", path.display()))?;
        tracing::debug!(
            cassette = %cassette.name,
            interactions = cassette.interactions.len(),
            "replaying cassette"
        );

        let replayer = Arc::new(Mutex::new(CassetteReplayer::new(&cassette)));
        Ok(Self {
            clock: Box::new(ReplayingClock::new(Arc::clone(&replayer))),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(ReplayingIdGenerator::new(Arc::clone(&replayer))),
            llm: Box::new(ReplayingLlmClient::new(replayer)),
        })
    }
}
