//! Simulation tunables.
//!
//! Defaults are the canonical rules; a JSON file can override any
//! subset of fields for a run. The catalog itself is code, not config —
//! see catalog.rs.

use crate::error::SimResult;
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// How often the background sweep runs.
    pub sweep_interval_secs: u64,
    /// Cap on elapsed time credited in a single sweep tick. Bounds
    /// catch-up accrual after long downtime.
    pub max_catchup_secs: u64,
    /// Elapsed time substituted when a stored `last_update` sits in the
    /// future relative to process time (clock skew, corrupted row).
    pub clock_skew_fallback_secs: u64,
    /// Below this maintenance level, accrual and drain both pause.
    pub accrual_pause_threshold: f64,
    /// Minimum wall-clock gap between successful collections.
    pub collect_cooldown_secs: u64,
    /// Maintenance level a repair restores — partial operability, not
    /// full health.
    pub repair_maintenance_reset: f64,
    /// Points applied by maintain() when the caller passes no amount.
    pub default_maintain_points: f64,
    /// Substitute one hour's return when a collection would pay out
    /// ≤ 1 coin on a healthy holding (boundary-timing compensation).
    pub collect_minimum_floor: bool,
    /// Drop holdings the sweep finds with zero maintenance, zero
    /// accumulated yield, and no active risk event.
    pub prune_abandoned: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 300,
            max_catchup_secs: 86_400,
            clock_skew_fallback_secs: 60,
            accrual_pause_threshold: 25.0,
            collect_cooldown_secs: 3_600,
            repair_maintenance_reset: 50.0,
            default_maintain_points: 25.0,
            collect_minimum_floor: true,
            prune_abandoned: true,
        }
    }
}

impl SimConfig {
    /// Load overrides from a JSON file. Missing fields keep their
    /// defaults.
    pub fn load(path: &str) -> SimResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        let config: SimConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }
}
