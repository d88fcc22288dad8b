//! Unit Command - headless runner
//!
//! Replays a scripted scenario, or generates a random match, through the
//! action dispatcher and prints a summary of what was admitted.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use unit_command::admission::{Facility, FacilityTable};
use unit_command::command::{
    ActionType, DispatchOutcome, EffectLog, IgnoreReason, MoveParams, Submission,
};
use unit_command::core::error::Result;
use unit_command::core::types::{
    FacilityId, FacilityType, PlayerId, Rect, UnitId, Vec2, VehicleType,
};
use unit_command::core::GameRules;
use unit_command::simulation::{Scenario, Simulation, TickReport};
use unit_command::units::{RegistrySnapshot, Unit, UnitRegistry};

/// Headless runner - feeds player actions through the admission core
#[derive(Parser, Debug)]
#[command(name = "unit-command")]
#[command(about = "Run scripted or random matches through the action dispatcher")]
struct Args {
    /// Rules file (TOML); built-in defaults when absent
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Scenario file (JSON); a random match is generated when absent
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Players in a random match
    #[arg(long, default_value_t = 2)]
    players: u32,

    /// Units spawned per player in a random match
    #[arg(long, default_value_t = 50)]
    units_per_player: u32,

    /// Ticks to run in a random match
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Include the final registry snapshot in the output
    #[arg(long)]
    snapshot: bool,
}

/// Per-player totals over the whole run
#[derive(Debug, Default, Serialize)]
struct PlayerSummary {
    applied: u64,
    idle: u64,
    denied: u64,
    malformed: u64,
    duplicate: u64,
    selected_at_end: usize,
    groups_at_end: usize,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: Option<u64>,
    ticks: u64,
    effects: usize,
    players: BTreeMap<PlayerId, PlayerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<RegistrySnapshot>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("unit_command=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let rules = match &args.rules {
        Some(path) => GameRules::load(path)?,
        None => GameRules::default(),
    };
    tracing::info!(
        base = rules.base_action_count,
        interval = rules.action_detection_interval,
        "rules loaded"
    );

    let mut effects = EffectLog::new();
    let mut reports = Vec::new();

    let (simulation, seed) = match &args.scenario {
        Some(path) => {
            let scenario = Scenario::load(path)?;
            let facilities = scenario.facility_table();
            let mut simulation = scenario.simulation(rules)?;
            for scripted in scenario.ticks {
                let report = simulation.run_tick(
                    scripted.tick,
                    scripted.submissions,
                    &facilities,
                    &mut effects,
                );
                reports.push(report);
            }
            (simulation, None)
        }
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (mut simulation, facilities) = random_match(&args, rules, &mut rng)?;
            for tick in 1..=args.ticks {
                let submissions = random_submissions(&simulation, &facilities, &mut rng);
                reports.push(simulation.run_tick(tick, submissions, &facilities, &mut effects));
            }
            (simulation, Some(seed))
        }
    };

    let summary = summarize(&simulation, &reports, effects.len(), seed, args.snapshot);
    tracing::info!(ticks = summary.ticks, effects = summary.effects, "run complete");

    match args.format.as_str() {
        "text" => print_text(&summary),
        other => {
            if other != "json" {
                tracing::warn!(format = other, "unknown format, defaulting to json");
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Spawn units scattered over the world and one control center per player
fn random_match(
    args: &Args,
    rules: GameRules,
    rng: &mut ChaCha8Rng,
) -> Result<(Simulation, FacilityTable)> {
    let mut registry = UnitRegistry::new();
    let mut facilities = FacilityTable::new();
    let mut next_id = 1u64;

    for p in 1..=args.players {
        let player = PlayerId(p);
        for _ in 0..args.units_per_player {
            let vehicle_type = *VehicleType::ALL.choose(rng).unwrap_or(&VehicleType::Tank);
            let position = Vec2::new(
                rng.gen_range(0.0..rules.world_width),
                rng.gen_range(0.0..rules.world_height),
            );
            registry.spawn(Unit::new(UnitId(next_id), player, vehicle_type, position))?;
            next_id += 1;
        }
        facilities.insert(Facility::new(
            FacilityId(u64::from(p) * 2),
            FacilityType::ControlCenter,
            Some(player),
        ));
        facilities.insert(Facility::new(
            FacilityId(u64::from(p) * 2 + 1),
            FacilityType::VehicleFactory,
            Some(player),
        ));
    }

    let mut simulation = Simulation::new(rules, registry);
    for p in 1..=args.players {
        simulation.add_player(PlayerId(p));
    }
    Ok((simulation, facilities))
}

/// One submission per player, occasionally a second one or a malformed one
fn random_submissions(
    simulation: &Simulation,
    facilities: &FacilityTable,
    rng: &mut ChaCha8Rng,
) -> Vec<Submission> {
    let players: Vec<PlayerId> = simulation.players().collect();
    let mut submissions = Vec::with_capacity(players.len());

    for player in players {
        let count = if rng.gen_bool(0.05) { 2 } else { 1 };
        for _ in 0..count {
            let params = random_params(player, simulation, facilities, rng);
            submissions.push(Submission::new(player, params));
        }
    }
    submissions
}

fn random_params(
    player: PlayerId,
    simulation: &Simulation,
    facilities: &FacilityTable,
    rng: &mut ChaCha8Rng,
) -> MoveParams {
    let rules = simulation.rules();
    let group = rng.gen_range(1..=rules.max_unit_group.min(10));
    let mut params = match rng.gen_range(0..11) {
        0 | 1 => MoveParams::none(),
        2 => MoveParams::clear_and_select(random_rect(rules, rng)),
        3 => MoveParams::add_to_selection(random_rect(rules, rng)),
        4 => MoveParams::deselect(random_rect(rules, rng)),
        5 => MoveParams::select_group(group),
        6 => MoveParams::assign(group),
        7 => match rng.gen_range(0..2) {
            0 => MoveParams::dismiss(group),
            _ => MoveParams::disband(group),
        },
        8 => match rng.gen_range(0..3) {
            0 => MoveParams::move_by(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)),
            1 => MoveParams::rotate(
                rng.gen_range(0.0..rules.world_width),
                rng.gen_range(0.0..rules.world_height),
                rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI),
            ),
            _ => MoveParams::scale(
                rng.gen_range(0.0..rules.world_width),
                rng.gen_range(0.0..rules.world_height),
                rng.gen_range(rules.min_scale_factor..=rules.max_scale_factor),
            ),
        },
        9 => {
            let factory = facilities
                .iter()
                .find(|f| f.kind == FacilityType::VehicleFactory && f.owner == Some(player))
                .map(|f| f.id)
                .unwrap_or(FacilityId(0));
            MoveParams::setup_production(factory, VehicleType::ALL.choose(rng).copied())
        }
        _ => {
            let own: Vec<UnitId> = simulation
                .registry()
                .owned_by(player)
                .map(|u| u.id)
                .collect();
            let guide = own.choose(rng).copied().unwrap_or(UnitId(0));
            MoveParams::nuclear_strike(
                rng.gen_range(0.0..rules.world_width),
                rng.gen_range(0.0..rules.world_height),
                guide,
            )
        }
    };

    if params.action.is_selection() && rng.gen_bool(0.2) {
        params.vehicle_type = VehicleType::ALL.choose(rng).copied();
    }
    // Drop a required field now and then so malformed actions show up
    if params.action != ActionType::None && rng.gen_bool(0.03) {
        params.left = None;
        params.group = None;
        params.x = None;
        params.facility_id = None;
        params.vehicle_id = None;
    }
    params
}

fn random_rect(rules: &GameRules, rng: &mut ChaCha8Rng) -> Rect {
    let left = rng.gen_range(0.0..rules.world_width);
    let top = rng.gen_range(0.0..rules.world_height);
    let width = rng.gen_range(0.0..rules.world_width / 4.0);
    let height = rng.gen_range(0.0..rules.world_height / 4.0);
    Rect::new(left, top, left + width, top + height)
}

fn summarize(
    simulation: &Simulation,
    reports: &[TickReport],
    effects: usize,
    seed: Option<u64>,
    with_snapshot: bool,
) -> RunSummary {
    let mut players: BTreeMap<PlayerId, PlayerSummary> = BTreeMap::new();

    for report in reports.iter().flat_map(|t| t.reports.iter()) {
        let entry = players.entry(report.player).or_default();
        match &report.outcome {
            DispatchOutcome::Idle => entry.idle += 1,
            DispatchOutcome::Applied(_) => entry.applied += 1,
            DispatchOutcome::Ignored(IgnoreReason::AdmissionDenied) => entry.denied += 1,
            DispatchOutcome::Ignored(IgnoreReason::Malformed(_)) => entry.malformed += 1,
            DispatchOutcome::Ignored(IgnoreReason::DuplicateSubmission) => entry.duplicate += 1,
        }
    }

    let registry = simulation.registry();
    for (player, entry) in players.iter_mut() {
        entry.selected_at_end = registry.selection(*player).len();
        entry.groups_at_end = registry.groups_of(*player).count();
    }

    RunSummary {
        seed,
        ticks: reports.len() as u64,
        effects,
        players,
        snapshot: with_snapshot.then(|| simulation.snapshot()),
    }
}

fn print_text(summary: &RunSummary) {
    println!("Run Summary");
    println!("===========");
    if let Some(seed) = summary.seed {
        println!("Seed: {}", seed);
    }
    println!("Ticks: {}", summary.ticks);
    println!("Effects forwarded: {}", summary.effects);
    println!();
    for (player, s) in &summary.players {
        println!(
            "{}: applied={} idle={} denied={} malformed={} duplicate={} selected={} groups={}",
            player,
            s.applied,
            s.idle,
            s.denied,
            s.malformed,
            s.duplicate,
            s.selected_at_end,
            s.groups_at_end
        );
    }
    if let Some(snapshot) = &summary.snapshot {
        println!();
        println!(
            "Final snapshot at tick {}: {} units, {} groups",
            snapshot.tick,
            snapshot.units.len(),
            snapshot.groups.len()
        );
    }
}
