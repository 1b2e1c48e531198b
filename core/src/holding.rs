//! One user's ownership record of one investment type.

use crate::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub holding_id: String,
    pub user_id: UserId,
    /// Catalog entry name.
    pub investment: String,
    pub purchase_ts: Timestamp,
    /// 0–100, clamped. Lowered by the sweep, raised by maintain/repair.
    pub maintenance: f64,
    /// Accrued-but-uncollected yield, 0 ..= type.max_holding.
    pub accumulated: f64,
    /// Active failure cause. `Some` halts accrual until repaired.
    pub risk_event: Option<String>,
    /// Last time the sweep or a mutating operation touched this row.
    pub last_update: Timestamp,
    /// Last successful collection, 0 = never.
    pub last_collection_ts: Timestamp,
}

impl Holding {
    pub fn new(holding_id: String, user_id: UserId, investment: &str, now: Timestamp) -> Self {
        Self {
            holding_id,
            user_id,
            investment: investment.to_string(),
            purchase_ts: now,
            maintenance: 100.0,
            accumulated: 0.0,
            risk_event: None,
            last_update: now,
            last_collection_ts: 0,
        }
    }

    /// Accrual and drain both pause while a risk event is active or
    /// maintenance sits below the threshold.
    pub fn is_locked_out(&self, threshold: f64) -> bool {
        self.risk_event.is_some() || self.maintenance < threshold
    }

    /// A holding the sweep treats as walked away from: nothing left to
    /// collect, nothing left to decay, nothing to repair.
    pub fn is_abandoned(&self) -> bool {
        self.risk_event.is_none() && self.maintenance <= 0.0 && self.accumulated <= 0.0
    }
}
