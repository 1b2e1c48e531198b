//! Shared primitive types used across the entire simulation.

/// Wall-clock time in whole seconds since the Unix epoch.
pub type Timestamp = u64;

/// A community member's stable numeric id.
pub type UserId = u64;

/// Whole currency units. Fractional yield only exists inside a holding's
/// `accumulated` field; every ledger movement is a whole number of coins.
pub type Coins = i64;

/// The canonical run identifier.
pub type RunId = String;

pub const SECS_PER_HOUR: u64 = 3_600;
