//! Dispatch throughput benchmarks
//!
//! Run with: `cargo bench --bench dispatch_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use unit_command::admission::{ActionRateLimiter, FacilityTable};
use unit_command::command::{ActionDispatcher, ActionRecord, EffectLog, MoveParams};
use unit_command::core::types::{PlayerId, Rect, UnitId, Vec2, VehicleType};
use unit_command::core::GameRules;
use unit_command::selection::{SelectMode, SelectionEngine, UnitFilter};
use unit_command::units::{Unit, UnitRegistry};

fn populated_registry(players: u32, per_player: u64) -> UnitRegistry {
    let mut registry = UnitRegistry::new();
    let mut id = 1;
    for p in 1..=players {
        for i in 0..per_player {
            let position = Vec2::new((i % 32) as f64 * 32.0, (i / 32) as f64 * 32.0);
            let vehicle_type = VehicleType::ALL[(i % 5) as usize];
            registry
                .spawn(Unit::new(UnitId(id), PlayerId(p), vehicle_type, position))
                .unwrap();
            id += 1;
        }
    }
    registry
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("clear_and_select");

    for per_player in [100u64, 500, 2_000] {
        let id = BenchmarkId::from_parameter(per_player);
        group.bench_with_input(id, &per_player, |b, &n| {
            let mut registry = populated_registry(2, n);
            let filter = UnitFilter::in_area(Rect::new(0.0, 0.0, 512.0, 512.0));
            b.iter(|| {
                black_box(SelectionEngine::select(
                    &mut registry,
                    PlayerId(1),
                    |u| filter.matches(u),
                    SelectMode::ClearAndSelect,
                ))
            });
        });
    }

    group.finish();
}

fn bench_limiter(c: &mut Criterion) {
    let rules = GameRules::default();
    let facilities = FacilityTable::new();

    c.bench_function("limiter_record_and_check", |b| {
        let mut limiter = ActionRateLimiter::new(&rules);
        let mut tick = 0u64;
        b.iter(|| {
            tick += 1;
            if limiter.can_act(PlayerId(1), tick, &facilities) {
                limiter.record_action(PlayerId(1), tick);
            }
            black_box(limiter.actions_in_window(PlayerId(1), tick))
        });
    });
}

fn bench_dispatch_ticks(c: &mut Criterion) {
    c.bench_function("dispatch_1000_ticks", |b| {
        b.iter(|| {
            let mut dispatcher = ActionDispatcher::new(GameRules::default());
            let mut registry = populated_registry(2, 200);
            let facilities = FacilityTable::new();
            let mut effects = EffectLog::new();

            for tick in 1..=1_000u64 {
                let params = match tick % 4 {
                    0 => MoveParams::clear_and_select(Rect::new(0.0, 0.0, 256.0, 256.0)),
                    1 => MoveParams::assign((tick % 10 + 1) as u32),
                    2 => MoveParams::move_by(1.0, -1.0),
                    _ => MoveParams::none(),
                };
                for p in 1..=2 {
                    let record = ActionRecord::new(PlayerId(p), tick, params.clone());
                    let report =
                        dispatcher.dispatch(&record, &mut registry, &facilities, &mut effects);
                    black_box(report);
                }
                effects.drain();
            }
        });
    });
}

criterion_group!(benches, bench_select, bench_limiter, bench_dispatch_ticks);
criterion_main!(benches);
