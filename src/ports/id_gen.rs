//! ID generator port for pipeline run identifiers.

/// Generates unique identifiers.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
