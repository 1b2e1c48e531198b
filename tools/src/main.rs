//! venture-runner: headless driver for the investment simulation.
//!
//! Usage:
//!   venture-runner --seed 12345 --users 8 --hours 72 --db run.db
//!   venture-runner --seed 12345 --ipc-mode
//!
//! Batch mode seeds demo users, lets them buy and manage ventures on a
//! manual clock, and prints an end-of-run summary. IPC mode reads
//! line-delimited JSON commands on stdin and replies with JSON state —
//! a driver harness for UIs and scripts, not a user-facing surface.

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use venture_core::{
    clock::WallClock,
    config::SimConfig,
    engine::InvestEngine,
    holding::Holding,
    rng::{RngBank, RngStream},
    store::SimStore,
    types::{Coins, Timestamp, UserId},
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Status,
    Advance { hours: f64 },
    Purchase { user_id: UserId, investment: String },
    Collect { user_id: UserId, investment: String },
    Maintain {
        user_id: UserId,
        investment: String,
        points: Option<f64>,
    },
    Repair { user_id: UserId, investment: String },
    Sell { user_id: UserId, investment: String },
    Quit,
}

#[derive(serde::Serialize)]
struct StatusDoc {
    now: Timestamp,
    holdings: Vec<Holding>,
    balances: Vec<(UserId, Coins)>,
    event_count: i64,
}

const STARTING_BALANCE: Coins = 10_000;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let users = parse_arg(&args, "--users", 8u64);
    let hours = parse_arg(&args, "--hours", 72u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => SimConfig::load(&w[1])?,
        None => SimConfig::default(),
    };

    if !ipc_mode {
        println!("venture-runner");
        println!("  seed:  {seed}");
        println!("  users: {users}");
        println!("  hours: {hours}");
        println!("  db:    {db}");
        println!();
    }

    let store = SimStore::open(&db_path(db))?;
    store.migrate()?;

    let start_ts = chrono::Utc::now().timestamp().max(0) as Timestamp;
    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"), start_ts)?;

    let mut engine = InvestEngine::build(
        run_id.clone(),
        seed,
        store,
        WallClock::manual(start_ts),
        config,
    )?;

    for user in 1..=users {
        engine.deposit(user, STARTING_BALANCE)?;
    }

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        run_batch(&mut engine, seed, users, hours)?;
        print_summary(&engine, users, hours)?;
    }

    Ok(())
}

/// For :memory: use a SQLite shared-memory URI so a reopened
/// connection would still see the same database.
fn db_path(db: &str) -> String {
    if db == ":memory:" {
        let stamp = chrono::Utc::now().timestamp_micros();
        format!("file:venture_{stamp}?mode=memory&cache=shared")
    } else {
        db.to_string()
    }
}

/// Drive `users` demo users through `hours` of simulated time, one
/// sweep interval per step. All demo decisions come from the Runner
/// RNG stream, so a given seed replays the same session.
fn run_batch(engine: &mut InvestEngine, seed: u64, users: u64, hours: u64) -> Result<()> {
    let mut rng = RngBank::new(seed).stream(RngStream::Runner);
    let interval = engine.config().sweep_interval_secs;
    let steps = hours * 3_600 / interval;

    for _ in 0..steps {
        engine.clock.advance(interval);
        engine.run_sweep()?;

        for user in 1..=users {
            // Occasionally buy something affordable and not yet owned.
            if rng.chance(0.03) {
                let types: Vec<String> = engine
                    .catalog
                    .types()
                    .iter()
                    .map(|t| t.name.clone())
                    .collect();
                let pick = rng.pick(&types).clone();
                match engine.purchase(user, &pick) {
                    Ok(_) => log::info!("user {user} bought '{pick}'"),
                    Err(e) => log::debug!("user {user} purchase declined: {e}"),
                }
            }

            for holding in engine.holdings(user)? {
                if holding.risk_event.is_some() {
                    if rng.chance(0.50) {
                        let _ = engine.repair(user, &holding.investment);
                    }
                    continue;
                }
                if rng.chance(0.10) {
                    let _ = engine.collect(user, &holding.investment);
                }
                if holding.maintenance < 60.0 && rng.chance(0.30) {
                    let _ = engine.maintain(user, &holding.investment, None, 25);
                }
            }
        }
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut InvestEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Status => status_doc(engine)?,
            IpcCommand::Advance { hours } => {
                let interval = engine.config().sweep_interval_secs;
                let mut remaining = (hours * 3_600.0) as u64;
                while remaining > 0 {
                    let step = remaining.min(interval);
                    engine.clock.advance(step);
                    engine.run_sweep()?;
                    remaining -= step;
                }
                status_doc(engine)?
            }
            IpcCommand::Purchase { user_id, investment } => {
                op_reply(engine.purchase(user_id, &investment))
            }
            IpcCommand::Collect { user_id, investment } => {
                op_reply(engine.collect(user_id, &investment))
            }
            IpcCommand::Maintain {
                user_id,
                investment,
                points,
            } => op_reply(engine.maintain(user_id, &investment, points, 0)),
            IpcCommand::Repair { user_id, investment } => {
                op_reply(engine.repair(user_id, &investment))
            }
            IpcCommand::Sell { user_id, investment } => {
                op_reply(engine.sell(user_id, &investment))
            }
        };

        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn op_reply<T: serde::Serialize>(
    result: venture_core::error::SimResult<T>,
) -> String {
    match result {
        Ok(value) => serde_json::json!({ "ok": value }).to_string(),
        Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
    }
}

fn status_doc(engine: &InvestEngine) -> Result<String> {
    let store = engine.store();
    let doc = StatusDoc {
        now: engine.clock.now(),
        holdings: store.all_holdings()?,
        balances: store.all_balances()?,
        event_count: store.event_count(&engine.run_id)?,
    };
    Ok(serde_json::to_string(&doc)?)
}

fn print_summary(engine: &InvestEngine, users: u64, hours: u64) -> Result<()> {
    let store = engine.store();
    let holdings = store.all_holdings()?;
    let risk_active = holdings.iter().filter(|h| h.risk_event.is_some()).count();
    let events = store.event_count(&engine.run_id)?;
    let collected = store.event_count_by_type(&engine.run_id, "yield_collected")?;
    let triggered = store.event_count_by_type(&engine.run_id, "risk_event_triggered")?;
    let pruned = store.event_count_by_type(&engine.run_id, "holding_pruned")?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {}", engine.run_id);
    println!("  users:         {users}");
    println!("  hours:         {hours}");
    println!("  holdings:      {}", holdings.len());
    println!("  risk active:   {risk_active}");
    println!("  collections:   {collected}");
    println!("  risk events:   {triggered}");
    println!("  pruned:        {pruned}");
    println!("  total events:  {events}");

    println!();
    println!("=== BALANCES ===");
    for (user, coins) in store.all_balances()? {
        let owned = holdings.iter().filter(|h| h.user_id == user).count();
        println!("  user {user:>3}: {coins:>8} coins, {owned} holdings");
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
