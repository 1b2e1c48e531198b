//! The investment engine — catalog, clock, RNG, and store wired
//! together behind the five user operations and the periodic sweep.
//!
//! RULES:
//!   - Every mutating method takes &mut self: one engine, one writer.
//!     A multi-threaded embedding must put the engine behind a mutex —
//!     the single-writer discipline is part of the correctness
//!     argument, not an accident of the original environment.
//!   - Ledger movement and holding mutation are ordered the same way
//!     everywhere: debit before creating state, credit after removing
//!     it.
//!   - The sweep never lets one bad row abort the pass: malformed
//!     holdings are logged and skipped, the checkpoint still advances.
//!   - All randomness flows through the RngBank streams.

use crate::{
    catalog::Catalog,
    clock::WallClock,
    config::SimConfig,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    holding::Holding,
    ledger,
    rng::{RngBank, RngStream, StreamRng},
    store::SimStore,
    sweep,
    types::{Coins, RunId, Timestamp, UserId},
};

/// Manual-clock epoch used by build_test(): 2023-11-14 22:13:20 UTC.
pub const TEST_EPOCH: Timestamp = 1_700_000_000;

pub struct InvestEngine {
    pub run_id: RunId,
    pub clock: WallClock,
    pub catalog: Catalog,
    config: SimConfig,
    store: SimStore,
    risk_rng: StreamRng,
    id_rng: StreamRng,
}

/// Counters describing one completed sweep pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepSummary {
    pub holdings_swept: i64,
    pub yield_accrued: f64,
    pub risk_events_triggered: i64,
    pub pruned: i64,
}

impl InvestEngine {
    pub fn new(
        run_id: RunId,
        seed: u64,
        store: SimStore,
        clock: WallClock,
        config: SimConfig,
    ) -> Self {
        let bank = RngBank::new(seed);
        Self {
            run_id,
            clock,
            catalog: Catalog::builtin(),
            config,
            risk_rng: bank.stream(RngStream::RiskEvents),
            id_rng: bank.stream(RngStream::Identity),
            store,
        }
    }

    /// Build a fully wired engine and record RunInitialized.
    pub fn build(
        run_id: RunId,
        seed: u64,
        store: SimStore,
        clock: WallClock,
        config: SimConfig,
    ) -> SimResult<Self> {
        let engine = Self::new(run_id.clone(), seed, store, clock, config);
        engine.append(&SimEvent::RunInitialized { run_id, seed })?;
        Ok(engine)
    }

    /// Test constructor: in-memory store, migrated, manual clock at
    /// TEST_EPOCH, default config.
    pub fn build_test(run_id: &str, seed: u64) -> SimResult<Self> {
        Self::build_test_with_config(run_id, seed, SimConfig::default())
    }

    pub fn build_test_with_config(
        run_id: &str,
        seed: u64,
        config: SimConfig,
    ) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        store.insert_run(run_id, seed, env!("CARGO_PKG_VERSION"), TEST_EPOCH)?;
        Self::build(
            run_id.to_string(),
            seed,
            store,
            WallClock::manual(TEST_EPOCH),
            config,
        )
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    // ── Operations ─────────────────────────────────────────────

    /// Buy one venture of the named type. Debits the full cost up
    /// front; the debit is refunded if the holding cannot be created.
    /// Returns the new holding's id.
    pub fn purchase(&mut self, user_id: UserId, name: &str) -> SimResult<String> {
        let now = self.clock.now();
        let ty = self
            .catalog
            .get(name)
            .ok_or_else(|| SimError::UnknownInvestment {
                name: name.to_string(),
            })?;

        if self.store.get_holding(user_id, &ty.name)?.is_some() {
            return Err(SimError::DuplicateHolding {
                user_id,
                investment: ty.name.clone(),
            });
        }

        ledger::debit(&self.store, user_id, ty.cost)?;

        let holding_id = format!("hold-{user_id}-{:08x}", self.id_rng.next_u64() as u32);
        let holding = Holding::new(holding_id.clone(), user_id, &ty.name, now);
        if let Err(e) = self.store.insert_holding(&holding) {
            // Creation failed after the debit — hand the coins back.
            let _ = ledger::credit(&self.store, user_id, ty.cost);
            return Err(e);
        }

        self.append(&SimEvent::HoldingPurchased {
            ts: now,
            user_id,
            investment: ty.name.clone(),
            cost: ty.cost,
        })?;
        log::debug!("user {user_id} purchased '{}' for {}", ty.name, ty.cost);
        Ok(holding_id)
    }

    /// Convert accumulated yield to coins. Throttled to one collection
    /// per cooldown window regardless of how much has accumulated.
    pub fn collect(&mut self, user_id: UserId, name: &str) -> SimResult<Coins> {
        let now = self.clock.now();
        let mut holding = self.holding(user_id, name)?;
        let ty = self.catalog_entry(&holding.investment)?;

        if let Some(cause) = &holding.risk_event {
            return Err(SimError::RiskEventActive {
                investment: holding.investment.clone(),
                cause: cause.clone(),
            });
        }

        if holding.last_collection_ts > 0 {
            let since = now.saturating_sub(holding.last_collection_ts);
            if since < self.config.collect_cooldown_secs {
                return Err(SimError::OnCooldown {
                    remaining_secs: self.config.collect_cooldown_secs - since,
                });
            }
        }

        // Ceiling rounding: the user never loses a fractional coin.
        let mut payout = holding.accumulated.ceil() as Coins;
        if self.config.collect_minimum_floor
            && payout <= 1
            && holding.maintenance >= self.config.accrual_pause_threshold
        {
            // Boundary-timing compensation: a healthy holding never
            // collects less than one hour's return.
            payout = ty.hourly_return.ceil() as Coins;
        }

        if payout > 0 {
            ledger::credit(&self.store, user_id, payout)?;
        }
        holding.accumulated = 0.0;
        holding.last_collection_ts = now;
        self.store.update_holding(&holding)?;

        self.append(&SimEvent::YieldCollected {
            ts: now,
            user_id,
            investment: holding.investment.clone(),
            amount: payout,
        })?;
        Ok(payout)
    }

    /// Raise maintenance by `points` (default from config), capped at
    /// 100. `upkeep_cost` is whatever price the caller's schedule puts
    /// on the work; it is debited before the points apply and zero is
    /// free. Returns the new maintenance level.
    pub fn maintain(
        &mut self,
        user_id: UserId,
        name: &str,
        points: Option<f64>,
        upkeep_cost: Coins,
    ) -> SimResult<f64> {
        let now = self.clock.now();
        let mut holding = self.holding(user_id, name)?;

        if let Some(cause) = &holding.risk_event {
            return Err(SimError::RiskEventActive {
                investment: holding.investment.clone(),
                cause: cause.clone(),
            });
        }

        if upkeep_cost > 0 {
            ledger::debit(&self.store, user_id, upkeep_cost)?;
        }

        let points = points.unwrap_or(self.config.default_maintain_points);
        holding.maintenance = (holding.maintenance + points).min(100.0);
        holding.last_update = now;
        self.store.update_holding(&holding)?;

        self.append(&SimEvent::MaintenancePerformed {
            ts: now,
            user_id,
            investment: holding.investment.clone(),
            points,
            maintenance: holding.maintenance,
        })?;
        Ok(holding.maintenance)
    }

    /// Clear an active risk event. Restores partial operability only:
    /// maintenance comes back at the configured reset level, not 100.
    pub fn repair(&mut self, user_id: UserId, name: &str) -> SimResult<()> {
        let now = self.clock.now();
        let mut holding = self.holding(user_id, name)?;

        let cause = match holding.risk_event.take() {
            Some(cause) => cause,
            None => {
                return Err(SimError::NoRiskEvent {
                    investment: holding.investment.clone(),
                })
            }
        };

        holding.maintenance = self.config.repair_maintenance_reset;
        holding.last_update = now;
        self.store.update_holding(&holding)?;

        self.append(&SimEvent::HoldingRepaired {
            ts: now,
            user_id,
            investment: holding.investment.clone(),
            cause,
        })?;
        Ok(())
    }

    /// Liquidate a holding in any state — risk event or not — for half
    /// its purchase cost. Returns the refund.
    pub fn sell(&mut self, user_id: UserId, name: &str) -> SimResult<Coins> {
        let now = self.clock.now();
        let holding = self.holding(user_id, name)?;
        let ty = self.catalog_entry(&holding.investment)?;

        let refund = ty.cost / 2;
        self.store.delete_holding(user_id, &holding.investment)?;
        if refund > 0 {
            ledger::credit(&self.store, user_id, refund)?;
        }

        self.append(&SimEvent::HoldingSold {
            ts: now,
            user_id,
            investment: holding.investment.clone(),
            refund,
        })?;
        log::debug!("user {user_id} sold '{}' for {refund}", holding.investment);
        Ok(refund)
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn holding(&self, user_id: UserId, name: &str) -> SimResult<Holding> {
        self.store
            .get_holding(user_id, name)?
            .ok_or_else(|| SimError::NoHolding {
                user_id,
                investment: name.to_string(),
            })
    }

    pub fn holdings(&self, user_id: UserId) -> SimResult<Vec<Holding>> {
        self.store.holdings_for_user(user_id)
    }

    pub fn balance(&self, user_id: UserId) -> SimResult<Coins> {
        self.store.balance(user_id)
    }

    /// Bootstrap credit — starting balances, admin grants.
    pub fn deposit(&mut self, user_id: UserId, amount: Coins) -> SimResult<Coins> {
        ledger::credit(&self.store, user_id, amount)
    }

    // ── Sweep ──────────────────────────────────────────────────

    /// Advance every holding's time-dependent state to now.
    ///
    /// Per-instance failures are logged and skipped; the pass always
    /// completes and the checkpoint always advances. An interrupted
    /// sweep is harmless — each holding's own last_update makes the
    /// next pass compute correct elapsed time.
    pub fn run_sweep(&mut self) -> SimResult<SweepSummary> {
        let now = self.clock.now();
        let checkpoint = self.store.last_sweep_ts()?.unwrap_or(0);
        let mut summary = SweepSummary::default();

        for mut holding in self.store.all_holdings()? {
            let ty = match self.catalog.get(&holding.investment) {
                Some(ty) => ty,
                None => {
                    log::warn!(
                        "sweep: holding {} references unknown investment '{}' — skipped",
                        holding.holding_id,
                        holding.investment
                    );
                    continue;
                }
            };

            let elapsed =
                sweep::effective_elapsed(now, holding.last_update, checkpoint, &self.config);
            let events =
                sweep::advance_holding(&mut holding, ty, now, elapsed, &self.config, &mut self.risk_rng);

            if self.config.prune_abandoned && holding.is_abandoned() {
                self.store
                    .delete_holding(holding.user_id, &holding.investment)?;
                self.append(&SimEvent::HoldingPruned {
                    ts: now,
                    user_id: holding.user_id,
                    investment: holding.investment.clone(),
                })?;
                summary.pruned += 1;
                continue;
            }

            if let Err(e) = self.store.update_holding(&holding) {
                log::warn!(
                    "sweep: failed to persist holding {}: {e} — skipped",
                    holding.holding_id
                );
                continue;
            }

            for event in &events {
                match event {
                    SimEvent::YieldAccrued { amount, .. } => summary.yield_accrued += amount,
                    SimEvent::RiskEventTriggered {
                        user_id,
                        investment,
                        cause,
                        ..
                    } => {
                        summary.risk_events_triggered += 1;
                        log::warn!(
                            "risk event on user {user_id}'s '{investment}': {cause}"
                        );
                    }
                    _ => {}
                }
                self.append(event)?;
            }
            summary.holdings_swept += 1;
        }

        self.store.set_last_sweep_ts(now)?;
        self.append(&SimEvent::SweepCompleted {
            ts: now,
            holdings_swept: summary.holdings_swept,
            yield_accrued: summary.yield_accrued,
            risk_events_triggered: summary.risk_events_triggered,
            pruned: summary.pruned,
        })?;

        log::debug!(
            "sweep @{now}: {} holdings, +{:.1} yield, {} risk events, {} pruned",
            summary.holdings_swept,
            summary.yield_accrued,
            summary.risk_events_triggered,
            summary.pruned
        );
        Ok(summary)
    }

    // ── Internals ──────────────────────────────────────────────

    fn catalog_entry(&self, name: &str) -> SimResult<&crate::catalog::InvestmentType> {
        self.catalog
            .get(name)
            .ok_or_else(|| SimError::UnknownInvestment {
                name: name.to_string(),
            })
    }

    /// Persist one event to the log.
    fn append(&self, event: &SimEvent) -> SimResult<()> {
        let ts = match event {
            SimEvent::RunInitialized { .. } => self.clock.now(),
            SimEvent::HoldingPurchased { ts, .. }
            | SimEvent::YieldCollected { ts, .. }
            | SimEvent::MaintenancePerformed { ts, .. }
            | SimEvent::HoldingRepaired { ts, .. }
            | SimEvent::HoldingSold { ts, .. }
            | SimEvent::YieldAccrued { ts, .. }
            | SimEvent::RiskEventTriggered { ts, .. }
            | SimEvent::HoldingPruned { ts, .. }
            | SimEvent::SweepCompleted { ts, .. } => *ts,
        };
        let entry = EventLogEntry {
            id: None,
            run_id: self.run_id.clone(),
            ts,
            source: "engine".to_string(),
            event_type: event_type_name(event).to_string(),
            payload: serde_json::to_string(event)?,
        };
        self.store.append_event(&entry)
    }
}

/// Extract a stable string name from a SimEvent variant.
/// Used for the event_type column in event_log.
pub fn event_type_name(event: &SimEvent) -> &'static str {
    match event {
        SimEvent::RunInitialized { .. } => "run_initialized",
        SimEvent::HoldingPurchased { .. } => "holding_purchased",
        SimEvent::YieldCollected { .. } => "yield_collected",
        SimEvent::MaintenancePerformed { .. } => "maintenance_performed",
        SimEvent::HoldingRepaired { .. } => "holding_repaired",
        SimEvent::HoldingSold { .. } => "holding_sold",
        SimEvent::YieldAccrued { .. } => "yield_accrued",
        SimEvent::RiskEventTriggered { .. } => "risk_event_triggered",
        SimEvent::HoldingPruned { .. } => "holding_pruned",
        SimEvent::SweepCompleted { .. } => "sweep_completed",
    }
}
