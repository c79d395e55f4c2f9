//! Adapter implementations of the port traits.
//!
//! - `live` talks to the real clock, disk, and AI service.
//! - `replaying` serves recorded interactions from a cassette.
//! - `fixed` returns constant values for tests and offline runs.

pub mod fixed;
pub mod live;
pub mod replaying;
