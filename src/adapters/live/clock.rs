//! Live clock backed by the system time.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Stamps pipeline output with the real current time.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successive_readings_never_go_backwards() {
        let clock = LiveClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
