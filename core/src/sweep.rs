//! The time-advance algorithm — pure arithmetic over one holding.
//!
//! The engine's run_sweep() owns iteration, persistence, and the event
//! log; everything in this module is side-effect free so the accrual,
//! drain, and risk rules can be tested against exact elapsed times.
//!
//! RULES:
//!   - Accrual is quantized to whole elapsed hours. Fractional hours
//!     under 1 add nothing, which caps what a fast polling loop could
//!     farm from repeated ticks.
//!   - Maintenance drain is continuous over the same elapsed span.
//!   - A risk event can only trigger on the tick whose drain crosses
//!     the maintenance threshold, and only if none is already active.
//!   - A locked-out holding (low maintenance or active risk event)
//!     freezes both fields but still advances last_update, so clearing
//!     the lockout never double-charges the frozen interval.

use crate::{
    catalog::InvestmentType,
    config::SimConfig,
    event::SimEvent,
    holding::Holding,
    rng::StreamRng,
    types::{Timestamp, SECS_PER_HOUR},
};

/// Elapsed seconds credited to a holding for this tick.
///
/// Anchored at the later of the holding's own `last_update` and the
/// global sweep checkpoint, clamped to the catch-up cap. An anchor in
/// the future (clock skew, corrupted row) yields the fixed fallback
/// rather than a negative or zero span.
pub fn effective_elapsed(
    now: Timestamp,
    last_update: Timestamp,
    checkpoint: Timestamp,
    config: &SimConfig,
) -> u64 {
    let anchor = last_update.max(checkpoint);
    if anchor > now {
        return config.clock_skew_fallback_secs;
    }
    (now - anchor).min(config.max_catchup_secs)
}

/// Advance one holding by `elapsed` seconds, ending at `now`.
///
/// Mutates the holding in place and returns the events describing what
/// changed. The caller persists the holding and appends the events.
pub fn advance_holding(
    holding: &mut Holding,
    ty: &InvestmentType,
    now: Timestamp,
    elapsed: u64,
    config: &SimConfig,
    rng: &mut StreamRng,
) -> Vec<SimEvent> {
    if holding.is_locked_out(config.accrual_pause_threshold) {
        holding.last_update = now;
        return Vec::new();
    }

    let mut events = Vec::new();
    let elapsed_hours = elapsed as f64 / SECS_PER_HOUR as f64;
    let whole_hours = (elapsed / SECS_PER_HOUR) as f64;

    // Accrual: whole hours only, capped exactly at max_holding.
    if whole_hours >= 1.0 {
        let before = holding.accumulated;
        holding.accumulated =
            (holding.accumulated + ty.hourly_return * whole_hours).min(ty.max_holding);
        if holding.accumulated > before {
            events.push(SimEvent::YieldAccrued {
                ts: now,
                user_id: holding.user_id,
                investment: holding.investment.clone(),
                amount: holding.accumulated - before,
                accumulated: holding.accumulated,
            });
        }
    }

    // Drain: continuous, clamped at zero.
    let before_maintenance = holding.maintenance;
    holding.maintenance = (holding.maintenance - ty.maintenance_drain * elapsed_hours).max(0.0);

    // Risk roll: only on the tick whose drain crosses the threshold.
    if before_maintenance >= config.accrual_pause_threshold
        && holding.maintenance < config.accrual_pause_threshold
        && holding.risk_event.is_none()
        && rng.chance(ty.risk_level.event_probability())
    {
        let cause = rng.pick(&ty.risk_events).clone();
        holding.risk_event = Some(cause.clone());
        events.push(SimEvent::RiskEventTriggered {
            ts: now,
            user_id: holding.user_id,
            investment: holding.investment.clone(),
            cause,
        });
    }

    holding.last_update = now;
    events
}
