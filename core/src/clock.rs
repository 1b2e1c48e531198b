//! Wall-clock source — every timestamp the simulation reads flows
//! through here.
//!
//! Production runs on the system clock. Tests and the headless runner
//! drive a manual clock so elapsed-time arithmetic is exact and
//! reproducible.

use crate::types::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSource {
    /// Real UTC wall-clock seconds.
    System,
    /// A manually advanced timestamp. Never moves on its own.
    Manual(Timestamp),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallClock {
    source: TimeSource,
}

impl WallClock {
    pub fn system() -> Self {
        Self {
            source: TimeSource::System,
        }
    }

    pub fn manual(start: Timestamp) -> Self {
        Self {
            source: TimeSource::Manual(start),
        }
    }

    /// Current time in whole seconds since the Unix epoch.
    pub fn now(&self) -> Timestamp {
        match self.source {
            TimeSource::System => chrono::Utc::now().timestamp().max(0) as Timestamp,
            TimeSource::Manual(ts) => ts,
        }
    }

    /// Advance a manual clock. Returns the new time.
    /// Panics on a system clock — callers must check.
    pub fn advance(&mut self, secs: u64) -> Timestamp {
        match &mut self.source {
            TimeSource::Manual(ts) => {
                *ts += secs;
                *ts
            }
            TimeSource::System => panic!("advance() called on a system clock"),
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.source, TimeSource::Manual(_))
    }
}
