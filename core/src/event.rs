//! Every observable state change, as an append-only event record.
//!
//! RULE: The engine appends one event per state change before the
//! operation returns. The event log is the replay/audit surface; the
//! holding and balance tables are the queryable current state.
//! Variants are added over time — never removed or reordered.

use crate::types::{Coins, RunId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },

    // ── User-triggered operations ──────────────────
    HoldingPurchased {
        ts: Timestamp,
        user_id: UserId,
        investment: String,
        cost: Coins,
    },
    YieldCollected {
        ts: Timestamp,
        user_id: UserId,
        investment: String,
        amount: Coins,
    },
    MaintenancePerformed {
        ts: Timestamp,
        user_id: UserId,
        investment: String,
        points: f64,
        maintenance: f64,
    },
    HoldingRepaired {
        ts: Timestamp,
        user_id: UserId,
        investment: String,
        cause: String,
    },
    HoldingSold {
        ts: Timestamp,
        user_id: UserId,
        investment: String,
        refund: Coins,
    },

    // ── Sweep-driven changes ───────────────────────
    YieldAccrued {
        ts: Timestamp,
        user_id: UserId,
        investment: String,
        amount: f64,
        accumulated: f64,
    },
    RiskEventTriggered {
        ts: Timestamp,
        user_id: UserId,
        investment: String,
        cause: String,
    },
    HoldingPruned {
        ts: Timestamp,
        user_id: UserId,
        investment: String,
    },
    SweepCompleted {
        ts: Timestamp,
        holdings_swept: i64,
        yield_accrued: f64,
        risk_events_triggered: i64,
        pruned: i64,
    },
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub ts: Timestamp,
    pub source: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
