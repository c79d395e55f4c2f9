//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first (if present), so
//! values can live there or in the real environment. Real environment
//! variables win over `.env` entries.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default chat-completions endpoint of the AI risk service.
pub const DEFAULT_AI_URL: &str = "http://localhost:3001/v1/chat/completions";
/// Default model identifier sent to the AI service.
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
/// Default completion budget per AI call.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Default AI request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default location of the persisted previous graph.
pub const DEFAULT_STATE_PATH: &str = ".confrisk/previous_graph.yaml";

/// Settings for reaching the AI risk and fix service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    /// Chat-completions endpoint.
    pub url: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_AI_URL.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// AI service settings.
    pub ai: AiConfig,
    /// Where the previous execution graph is stored.
    pub state_path: PathBuf,
    /// Cassette to replay clock, ID, and AI interactions from.
    pub replay: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { ai: AiConfig::default(), state_path: PathBuf::from(DEFAULT_STATE_PATH), replay: None }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and reads `CONFRISK_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error string if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::vars().collect())
    }

    /// Builds a configuration from an explicit variable map.
    ///
    /// # Errors
    ///
    /// Returns an error string if a numeric variable does not parse.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, String> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());
        let defaults = AiConfig::default();

        let max_tokens = match get("CONFRISK_AI_MAX_TOKENS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| format!("invalid CONFRISK_AI_MAX_TOKENS {raw:?}: {e}"))?,
            None => defaults.max_tokens,
        };
        let timeout = match get("CONFRISK_AI_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|e| format!("invalid CONFRISK_AI_TIMEOUT_SECS {raw:?}: {e}"))?,
            ),
            None => defaults.timeout,
        };

        Ok(Self {
            ai: AiConfig {
                url: get("CONFRISK_AI_URL").map_or(defaults.url, String::from),
                model: get("CONFRISK_AI_MODEL").map_or(defaults.model, String::from),
                max_tokens,
                timeout,
                api_key: get("CONFRISK_AI_API_KEY").map(String::from),
            },
            state_path: get("CONFRISK_STATE")
                .map_or_else(|| PathBuf::from(DEFAULT_STATE_PATH), PathBuf::from),
            replay: get("CONFRISK_REPLAY").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = AppConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ai.url, DEFAULT_AI_URL);
        assert_eq!(config.state_path, PathBuf::from(DEFAULT_STATE_PATH));
    }

    #[test]
    fn reads_every_variable() {
        let config = AppConfig::from_vars(vars(&[
            ("CONFRISK_AI_URL", "https://ai.internal/v1/chat/completions"),
            ("CONFRISK_AI_MODEL", "risk-large"),
            ("CONFRISK_AI_MAX_TOKENS", "2048"),
            ("CONFRISK_AI_TIMEOUT_SECS", "5"),
            ("CONFRISK_AI_API_KEY", "sk-test"),
            ("CONFRISK_STATE", "/tmp/state.yaml"),
            ("CONFRISK_REPLAY", "/tmp/run.cassette.yaml"),
        ]))
        .unwrap();
        assert_eq!(config.ai.model, "risk-large");
        assert_eq!(config.ai.max_tokens, 2048);
        assert_eq!(config.ai.timeout, Duration::from_secs(5));
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.state_path, PathBuf::from("/tmp/state.yaml"));
        assert_eq!(config.replay, Some(PathBuf::from("/tmp/run.cassette.yaml")));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_vars(vars(&[("CONFRISK_AI_MODEL", "  ")])).unwrap();
        assert_eq!(config.ai.model, DEFAULT_AI_MODEL);
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = AppConfig::from_vars(vars(&[("CONFRISK_AI_MAX_TOKENS", "lots")])).unwrap_err();
        assert!(err.contains("CONFRISK_AI_MAX_TOKENS"));
    }
}
