//! Clock port for obtaining the current time.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Every stage stamps its output (`parsedAt`, `generatedAt`, `comparedAt`)
/// through this port, so a fixed or recorded clock makes whole pipeline
/// runs reproducible.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
