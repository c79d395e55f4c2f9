//! Constant-value adapters for tests and offline runs.

use chrono::{DateTime, Utc};

use crate::ports::{Clock, IdGenerator};

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Creates a clock frozen at an RFC 3339 timestamp.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` is not valid RFC 3339.
    #[must_use]
    pub fn at(timestamp: &str) -> Self {
        let instant = DateTime::parse_from_rfc3339(timestamp)
            .unwrap_or_else(|e| panic!("invalid fixed clock timestamp {timestamp:?}: {e}"))
            .with_timezone(&Utc);
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// ID generator that always returns the same identifier.
#[derive(Debug, Clone)]
pub struct FixedIdGenerator(pub String);

impl IdGenerator for FixedIdGenerator {
    fn generate_id(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_same_instant() {
        let clock = FixedClock::at("2024-06-15T10:30:00Z");
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2024-06-15T10:30:00+00:00");
    }

    #[test]
    #[should_panic(expected = "invalid fixed clock timestamp")]
    fn fixed_clock_rejects_garbage() {
        let _ = FixedClock::at("yesterday");
    }

    #[test]
    fn fixed_id_generator_repeats() {
        let gen = FixedIdGenerator("run-1".into());
        assert_eq!(gen.generate_id(), "run-1");
        assert_eq!(gen.generate_id(), "run-1");
    }
}
