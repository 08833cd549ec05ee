//! Lira Headless Simulation Harness
//!
//! Runs the colony engine for a number of days with fixed daily health
//! metrics, then validates data files and engine invariants.
//! Runs entirely in-process, no UI and no health source.
//!
//! Usage:
//!   cargo run -p lira-simtest
//!   cargo run -p lira-simtest -- --days 365 --steps 9000 --verbose
//!   RUST_LOG=lira_core=debug cargo run -p lira-simtest -- --days 10

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use lira_core::catalog::BuildingCatalog;
use lira_core::components::{DailyHealthMetrics, HealthContributions, SimulationState};
use lira_core::driver::{DriverMeta, HealthSnapshot, RealtimeDriver};
use lira_core::engine::SimulationEngine;
use lira_core::persistence;
use lira_core::systems::MAX_LOG_LINES;
use lira_core::tuning::SimTuning;
use log::info;
use serde::Serialize;

// ── Data files (same JSON the app ships) ────────────────────────────────
const TUNING_JSON: &str = include_str!("../../../data/tuning.json");
const CATALOG_JSON: &str = include_str!("../../../data/building_catalog.json");

/// Headless colony runner
#[derive(Parser, Debug)]
#[command(name = "lira-simtest")]
#[command(about = "Run the Lira colony engine headless and validate its invariants")]
struct Args {
    /// In-game days to simulate
    #[arg(long, default_value_t = 100)]
    days: u32,

    /// Seed for flavor text
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Tuning override (JSON, any subset of fields)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Building catalog override (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Daily steps
    #[arg(long, default_value_t = 7000.0)]
    steps: f64,

    /// Daily exercise minutes
    #[arg(long, default_value_t = 25.0)]
    exercise: f64,

    /// Daily daylight minutes
    #[arg(long, default_value_t = 60.0)]
    daylight: f64,

    /// Hours slept each night
    #[arg(long, default_value_t = 7.5)]
    sleep: f64,

    /// Split every day into this many engine calls
    #[arg(long, default_value_t = 1)]
    ticks_per_day: u32,

    /// Print every check and the tail of the journal
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Print the final state as pretty JSON
    #[arg(long)]
    dump: bool,
}

/// JSON dump of a finished run
#[derive(Serialize)]
struct RunDump<'a> {
    seed: u64,
    days: u32,
    metrics: DailyHealthMetrics,
    state: &'a SimulationState,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    println!("=== Lira Simulation Harness ===\n");

    let tuning = match &args.tuning {
        Some(path) => SimTuning::load(path),
        None => Ok(SimTuning::default()),
    };
    let catalog = match &args.catalog {
        Some(path) => BuildingCatalog::load(path),
        None => Ok(BuildingCatalog::standard()),
    };
    let (tuning, catalog) = match (tuning, catalog) {
        (Ok(t), Ok(c)) => (t, c),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("config error: {}", e);
            std::process::exit(2);
        }
    };

    let metrics = DailyHealthMetrics::new(args.steps, args.daylight, args.exercise, args.sleep);
    let ctx = RunContext {
        tuning,
        catalog,
        metrics,
        seed: args.seed,
        days: args.days,
        ticks_per_day: args.ticks_per_day.max(1),
    };

    // 0. The configured run itself
    let (state, run_results) = run_colony(&ctx, args.verbose);

    let mut results = run_results;

    // 1. Data files
    results.extend(validate_data_files(args.verbose));

    // 2. Zero-input survivability
    results.extend(validate_zero_input(&ctx, args.verbose));

    // 3. Log cap
    results.extend(validate_log_cap(&state));

    // 4. Fractional equivalence
    results.extend(validate_fractional_equivalence(&ctx, args.verbose));

    // 5. Persistence round-trip
    results.extend(validate_persistence(&ctx, &state));

    // 6. Real-time driver catch-up
    results.extend(validate_driver(&ctx, args.verbose));

    if args.verbose {
        println!("\n--- Journal (last 20) ---");
        for line in state.event_log.recent(20) {
            println!("  {}", line);
        }
    }

    if args.dump {
        let dump = RunDump {
            seed: args.seed,
            days: args.days,
            metrics,
            state: &state,
        };
        match serde_json::to_string_pretty(&dump) {
            Ok(json) => println!("\n{}", json),
            Err(e) => eprintln!("dump failed: {}", e),
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

struct RunContext {
    tuning: SimTuning,
    catalog: BuildingCatalog,
    metrics: DailyHealthMetrics,
    seed: u64,
    days: u32,
    ticks_per_day: u32,
}

impl RunContext {
    fn engine(&self) -> SimulationEngine {
        SimulationEngine::with_seed(self.seed)
            .with_tuning(self.tuning.clone())
            .with_catalog(self.catalog.clone())
    }

    fn quiet_engine(&self) -> SimulationEngine {
        let mut engine = self.engine();
        engine.set_ambient_events(false);
        engine
    }
}

/// Advance one in-game day in `ticks` equal calls.
fn advance_day(
    engine: &mut SimulationEngine,
    state: &mut SimulationState,
    metrics: &DailyHealthMetrics,
    ticks: u32,
) {
    let slice = metrics.split(ticks);
    let f = 1.0 / f64::from(ticks);
    for tick in 0..ticks {
        engine.advance_fraction_of_day(state, &slice, f, tick + 1 == ticks);
    }
}

fn counters_valid(state: &SimulationState) -> bool {
    [
        state.population,
        state.housing_capacity,
        state.food_stock_rations,
        state.greenhouse_count,
        state.school_count,
        state.technology_level,
        state.explored_radius_km,
        state.build_points,
        state.science_points,
    ]
    .iter()
    .all(|v| v.is_finite() && *v >= 0.0)
}

// ── 0. Configured run ───────────────────────────────────────────────────

fn run_colony(ctx: &RunContext, verbose: bool) -> (SimulationState, Vec<TestResult>) {
    println!("--- Colony Run ---");
    let mut results = Vec::new();
    let mut engine = ctx.engine();
    let mut state = SimulationState::new_colony(engine.catalog());

    let mut monotonic = true;
    let mut non_negative = true;
    let mut first_violation = String::new();
    let mut prev = state.clone();

    for _ in 0..ctx.days {
        advance_day(&mut engine, &mut state, &ctx.metrics, ctx.ticks_per_day);

        let ok = state.current_day_index == prev.current_day_index + 1
            && state.explored_radius_km >= prev.explored_radius_km
            && state.technology_level >= prev.technology_level
            && state.population >= prev.population
            && state.housing_capacity >= prev.housing_capacity
            && state.greenhouse_count >= prev.greenhouse_count
            && state.school_count >= prev.school_count;
        if !ok && monotonic {
            monotonic = false;
            first_violation = format!("day {}", prev.current_day_index);
        }
        if !counters_valid(&state) {
            non_negative = false;
        }
        prev = state.clone();
    }

    info!(
        "run finished on day {} with {:.1} colonists",
        state.current_day_index, state.population
    );
    if verbose {
        print_state(&state);
    }

    results.push(TestResult {
        name: "run_day_index".into(),
        passed: state.current_day_index == 1 + ctx.days,
        detail: format!("{} days -> day {}", ctx.days, state.current_day_index),
    });
    results.push(TestResult {
        name: "run_monotonic_counters".into(),
        passed: monotonic,
        detail: if monotonic {
            "day, radius, tech, population and buildings never decrease".into()
        } else {
            format!("first decrease after {}", first_violation)
        },
    });
    results.push(TestResult {
        name: "run_non_negative".into(),
        passed: non_negative,
        detail: "all counters finite and >= 0".into(),
    });

    (state, results)
}

fn print_state(state: &SimulationState) {
    let c: &HealthContributions = &state.last_contributions;
    println!("  day:          {}", state.current_day_index);
    println!("  population:   {:.2} / {:.0} beds", state.population, state.housing_capacity);
    println!("  food:         {:.1} rations", state.food_stock_rations);
    println!(
        "  buildings:    {:.0} greenhouses, {:.0} schools",
        state.greenhouse_count, state.school_count
    );
    println!(
        "  tech:         {:.1} ({:.1} science)",
        state.technology_level, state.science_points
    );
    println!("  radius:       {:.2} km", state.explored_radius_km);
    println!(
        "  yesterday:    {:.2} km, {:.1} build pts, {:.2} science",
        c.total_exploration_km(),
        c.total_build_points(),
        c.total_science()
    );
    match &state.active_build {
        Some(b) => println!(
            "  building:     {} ({} of {} days left)",
            b.display_name, state.active_build_days_remaining, state.active_build_total_days
        ),
        None => println!("  building:     none, {} queued", state.build_queue.len()),
    }
}

// ── 1. Data Files ───────────────────────────────────────────────────────

fn validate_data_files(verbose: bool) -> Vec<TestResult> {
    println!("--- Data Files ---");
    let mut results = Vec::new();

    match SimTuning::from_json(TUNING_JSON) {
        Ok(tuning) => results.push(TestResult {
            name: "tuning_matches_defaults".into(),
            passed: tuning == SimTuning::default(),
            detail: "data/tuning.json equals the built-in defaults".into(),
        }),
        Err(e) => results.push(TestResult {
            name: "tuning_parse".into(),
            passed: false,
            detail: format!("{}", e),
        }),
    }

    match BuildingCatalog::from_json(CATALOG_JSON) {
        Ok(catalog) => {
            if verbose {
                println!("  {} catalog entries", catalog.buildings.len());
            }
            results.push(TestResult {
                name: "catalog_matches_standard".into(),
                passed: catalog == BuildingCatalog::standard(),
                detail: format!("{} buildings", catalog.buildings.len()),
            });
            let starter: Vec<_> = catalog
                .starter_queue()
                .iter()
                .map(|s| (s.display_name.as_str(), s.cost_points))
                .collect();
            results.push(TestResult {
                name: "catalog_starter_queue".into(),
                passed: starter == [("Greenhouse", 20.0), ("House", 15.0), ("School", 40.0)],
                detail: format!("{:?}", starter),
            });
        }
        Err(e) => results.push(TestResult {
            name: "catalog_parse".into(),
            passed: false,
            detail: format!("{}", e),
        }),
    }

    let bad = SimTuning::from_json(r#"{ "sleep_sigma": 0.0 }"#);
    results.push(TestResult {
        name: "tuning_rejects_zero_sigma".into(),
        passed: bad.is_err(),
        detail: match bad {
            Err(e) => format!("{}", e),
            Ok(_) => "accepted".into(),
        },
    });

    results
}

// ── 2. Zero Input ───────────────────────────────────────────────────────

fn validate_zero_input(ctx: &RunContext, verbose: bool) -> Vec<TestResult> {
    println!("--- Zero Input (100 days) ---");
    let mut engine = ctx.quiet_engine();
    let mut state = SimulationState::new_colony(engine.catalog());
    for _ in 0..100 {
        engine.advance_one_day(&mut state, None);
    }
    if verbose {
        print_state(&state);
    }

    vec![
        TestResult {
            name: "zero_input_day_index".into(),
            passed: state.current_day_index == 101,
            detail: format!("day {}", state.current_day_index),
        },
        TestResult {
            name: "zero_input_counters_valid".into(),
            passed: counters_valid(&state),
            detail: format!(
                "pop {:.2}, food {:.1}, radius {:.2} km",
                state.population, state.food_stock_rations, state.explored_radius_km
            ),
        },
        TestResult {
            name: "zero_input_passive_progress".into(),
            passed: state.explored_radius_km > 0.0 && state.population >= 8.0,
            detail: "passive exploration and no deaths".into(),
        },
    ]
}

// ── 3. Log Cap ──────────────────────────────────────────────────────────

fn validate_log_cap(state: &SimulationState) -> Vec<TestResult> {
    println!("--- Event Log ---");
    vec![TestResult {
        name: "log_capped".into(),
        passed: state.event_log.len() <= MAX_LOG_LINES,
        detail: format!("{} / {} lines", state.event_log.len(), MAX_LOG_LINES),
    }]
}

// ── 4. Fractional Equivalence ───────────────────────────────────────────

fn validate_fractional_equivalence(ctx: &RunContext, verbose: bool) -> Vec<TestResult> {
    println!("--- Fractional Equivalence ---");
    // Steps are linear in the split; exercise and daylight curves are not.
    let metrics = DailyHealthMetrics::new(ctx.metrics.steps, 0.0, 0.0, 0.0);

    let mut whole_engine = ctx.quiet_engine();
    let mut whole = SimulationState::new();
    let mut split_engine = ctx.quiet_engine();
    let mut split = SimulationState::new();
    for _ in 0..3 {
        advance_day(&mut whole_engine, &mut whole, &metrics, 1);
        advance_day(&mut split_engine, &mut split, &metrics, 4);
    }

    let close = |a: f64, b: f64| (a - b).abs() <= 1e-2 * a.abs().max(1.0);
    let pairs = [
        ("radius", whole.explored_radius_km, split.explored_radius_km),
        ("food", whole.food_stock_rations, split.food_stock_rations),
        ("population", whole.population, split.population),
        ("build_points", whole.build_points, split.build_points),
        ("science", whole.science_points, split.science_points),
    ];
    if verbose {
        for (name, a, b) in &pairs {
            println!("  {:<12} whole {:>10.4}  split {:>10.4}", name, a, b);
        }
    }

    let mut results: Vec<TestResult> = pairs
        .iter()
        .map(|(name, a, b)| TestResult {
            name: format!("fractional_{}", name),
            passed: close(*a, *b),
            detail: format!("{:.4} vs {:.4}", a, b),
        })
        .collect();
    results.push(TestResult {
        name: "fractional_day_index".into(),
        passed: whole.current_day_index == split.current_day_index,
        detail: format!("{} vs {}", whole.current_day_index, split.current_day_index),
    });
    results
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(ctx: &RunContext, state: &SimulationState) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();
    let engine = ctx.engine();

    let mut buffer = Vec::new();
    let saved = engine.save(&mut buffer, state);
    let mut restored_engine = ctx.engine();
    let loaded = saved.and_then(|_| restored_engine.load(&buffer[..]));
    results.push(TestResult {
        name: "save_load_roundtrip".into(),
        passed: matches!(&loaded, Ok(s) if s == state),
        detail: match &loaded {
            Ok(_) => format!("{} bytes", buffer.len()),
            Err(e) => format!("{}", e),
        },
    });

    let fallback = persistence::load_or_fresh(Some(&b"not a colony"[..]), &ctx.catalog);
    results.push(TestResult {
        name: "corrupt_state_falls_back".into(),
        passed: fallback == SimulationState::new_colony(&ctx.catalog),
        detail: "garbage bytes yield a fresh colony".into(),
    });

    results
}

// ── 6. Real-time Driver ─────────────────────────────────────────────────

fn validate_driver(ctx: &RunContext, verbose: bool) -> Vec<TestResult> {
    println!("--- Real-time Driver ---");
    let mut results = Vec::new();

    let (Some(start), Some(now)) = (
        NaiveDate::from_ymd_opt(2025, 6, 1).and_then(|d| d.and_hms_opt(18, 0, 0)),
        NaiveDate::from_ymd_opt(2025, 6, 4).and_then(|d| d.and_hms_opt(9, 0, 0)),
    ) else {
        results.push(TestResult {
            name: "driver_dates".into(),
            passed: false,
            detail: "could not build test dates".into(),
        });
        return results;
    };

    let mut engine = ctx.quiet_engine();
    let mut state = SimulationState::new_colony(engine.catalog());
    let snapshot = HealthSnapshot::new(
        ctx.metrics.steps,
        ctx.metrics.daylight_minutes,
        ctx.metrics.exercise_minutes,
        ctx.metrics.sleep_hours,
    );
    let mut driver = RealtimeDriver::new(DriverMeta::starting_at(start, &snapshot));
    let catch_up = driver.tick(&mut engine, &mut state, &snapshot, now);
    if verbose {
        println!(
            "  crossed {} midnights, partial {:.3}, day {}",
            catch_up.midnights_crossed, catch_up.partial_fraction, state.current_day_index
        );
    }

    results.push(TestResult {
        name: "driver_midnights".into(),
        passed: catch_up.midnights_crossed == 3 && state.current_day_index == 4,
        detail: format!(
            "{} midnights, day {}",
            catch_up.midnights_crossed, state.current_day_index
        ),
    });
    results.push(TestResult {
        name: "driver_partial_day".into(),
        passed: (catch_up.partial_fraction - 0.375).abs() < 1e-9,
        detail: format!("{:.4} of today simulated", catch_up.partial_fraction),
    });

    let again = driver.tick(&mut engine, &mut state, &snapshot, now);
    results.push(TestResult {
        name: "driver_repeat_tick_noop".into(),
        passed: again.midnights_crossed == 0 && again.partial_fraction == 0.0,
        detail: "same timestamp twice does nothing".into(),
    });

    let meta_json = driver.meta().to_json();
    let meta_ok = meta_json
        .as_deref()
        .ok()
        .and_then(|json| DriverMeta::from_json(json).ok())
        .is_some_and(|m| &m == driver.meta());
    results.push(TestResult {
        name: "driver_meta_json".into(),
        passed: meta_ok,
        detail: "metadata survives a JSON round-trip".into(),
    });

    results
}
