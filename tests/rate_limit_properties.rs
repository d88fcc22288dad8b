//! Property tests for admission, selection and grouping

use proptest::prelude::*;

use unit_command::admission::{ActionRateLimiter, Facility, FacilityTable};
use unit_command::command::{ActionDispatcher, ActionRecord, EffectLog, MoveParams};
use unit_command::core::types::{
    FacilityId, FacilityType, GroupId, PlayerId, Rect, UnitId, Vec2, VehicleType,
};
use unit_command::core::GameRules;
use unit_command::groups::GroupManager;
use unit_command::selection::{SelectMode, SelectionEngine, UnitFilter};
use unit_command::units::{Unit, UnitRegistry};

const RED: PlayerId = PlayerId(1);
const BLUE: PlayerId = PlayerId(2);

fn rules(base: u32, interval: u64) -> GameRules {
    GameRules {
        base_action_count: base,
        action_detection_interval: interval,
        ..GameRules::default()
    }
}

fn centers(count: u32) -> FacilityTable {
    (0..count)
        .map(|i| Facility::new(FacilityId(u64::from(i)), FacilityType::ControlCenter, Some(RED)))
        .collect()
}

fn registry_from(units: &[(bool, u8, f64, f64)]) -> UnitRegistry {
    let mut registry = UnitRegistry::new();
    for (i, &(red, kind, x, y)) in units.iter().enumerate() {
        let owner = if red { RED } else { BLUE };
        let vehicle_type = VehicleType::ALL[kind as usize % VehicleType::ALL.len()];
        registry
            .spawn(Unit::new(UnitId(i as u64 + 1), owner, vehicle_type, Vec2::new(x, y)))
            .unwrap();
    }
    registry
}

fn unit_strategy() -> impl Strategy<Value = Vec<(bool, u8, f64, f64)>> {
    prop::collection::vec((any::<bool>(), 0u8..5, 0.0f64..100.0, 0.0f64..100.0), 0..40)
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (0.0f64..100.0, 0.0f64..100.0, 0.0f64..60.0, 0.0f64..60.0)
        .prop_map(|(left, top, w, h)| Rect::new(left, top, left + w, top + h))
}

proptest! {
    #[test]
    fn test_full_window_is_never_admissible(
        base in 0u32..8,
        interval in 2u64..20,
        center_count in 0u32..4,
        ticks in prop::collection::btree_set(1u64..60, 0..40),
        query_tick in 1u64..80,
    ) {
        let facilities = centers(center_count);
        let mut limiter = ActionRateLimiter::new(&rules(base, interval));
        for &tick in ticks.iter().filter(|&&t| t <= query_tick) {
            limiter.record_action(RED, tick);
        }

        let ceiling = limiter.ceiling(RED, &facilities);
        prop_assert_eq!(ceiling, base + center_count);

        let in_window = ticks
            .iter()
            .filter(|&&t| t <= query_tick && t + interval - 1 > query_tick)
            .count();
        prop_assert_eq!(limiter.actions_in_window(RED, query_tick), in_window);
        let admissible = limiter.can_act(RED, query_tick, &facilities);
        prop_assert_eq!(admissible, (in_window as u32) < ceiling);
        prop_assert!(in_window as u64 <= interval - 1);
    }

    #[test]
    fn test_cooldown_elapses_to_admission(
        base in 1u32..6,
        interval in 2u64..15,
        ticks in prop::collection::btree_set(1u64..40, 0..30),
    ) {
        let facilities = FacilityTable::new();
        let mut limiter = ActionRateLimiter::new(&rules(base, interval));
        let mut last = 0;
        for &tick in &ticks {
            limiter.record_action(RED, tick);
            last = tick;
        }

        let wait = limiter.remaining_cooldown(RED, last, &facilities).unwrap();
        prop_assert!(limiter.can_act(RED, last + wait, &facilities));
        if wait > 0 {
            prop_assert!(!limiter.can_act(RED, last + wait - 1, &facilities));
        }
    }

    #[test]
    fn test_dispatcher_records_every_attempt(
        base in 0u32..5,
        interval in 2u64..10,
        plan in prop::collection::vec(0u8..4, 1..40),
    ) {
        let mut dispatcher = ActionDispatcher::new(rules(base, interval));
        let mut registry = registry_from(&[(true, 4, 1.0, 1.0)]);
        let facilities = FacilityTable::new();
        let mut effects = EffectLog::new();

        let mut attempts: Vec<u64> = Vec::new();
        for (i, step) in plan.iter().enumerate() {
            let tick = i as u64 + 1;
            let params = match step {
                0 => MoveParams::none(),
                1 => MoveParams::clear_and_select(Rect::new(0.0, 0.0, 5.0, 5.0)),
                2 => MoveParams::assign(0),
                _ => MoveParams::disband(3),
            };
            let record = ActionRecord::new(RED, tick, params);
            let report = dispatcher.dispatch(&record, &mut registry, &facilities, &mut effects);
            prop_assert_eq!(report.recorded, *step != 0);
            if *step != 0 {
                attempts.push(tick);
            }
            let expected = attempts.iter().filter(|&&t| t + interval - 1 > tick).count();
            prop_assert_eq!(dispatcher.limiter().actions_in_window(RED, tick), expected);
        }
    }

    #[test]
    fn test_clear_and_select_never_selects_foreign_units(
        units in unit_strategy(),
        rect in rect_strategy(),
        blue_first in any::<bool>(),
    ) {
        let mut registry = registry_from(&units);
        if blue_first {
            SelectionEngine::select(&mut registry, BLUE, |_| true, SelectMode::ClearAndSelect);
        }
        let blue_before = registry.selection(BLUE);

        let filter = UnitFilter::in_area(rect);
        SelectionEngine::select(
            &mut registry,
            RED,
            |u| filter.matches(u),
            SelectMode::ClearAndSelect,
        );

        for id in registry.selection(RED) {
            let unit = registry.get(id).unwrap();
            prop_assert_eq!(unit.owner, RED);
            prop_assert!(rect.contains(unit.position));
        }
        prop_assert_eq!(registry.selection(BLUE), blue_before);
    }

    #[test]
    fn test_add_to_selection_is_monotonic(
        units in unit_strategy(),
        first in rect_strategy(),
        second in rect_strategy(),
    ) {
        let mut registry = registry_from(&units);
        let a = UnitFilter::in_area(first);
        let b = UnitFilter::in_area(second);

        SelectionEngine::select(&mut registry, RED, |u| a.matches(u), SelectMode::ClearAndSelect);
        let before = registry.selection(RED);
        SelectionEngine::select(&mut registry, RED, |u| b.matches(u), SelectMode::AddToSelection);
        let after = registry.selection(RED);

        prop_assert!(before.iter().all(|id| after.binary_search(id).is_ok()));
    }

    #[test]
    fn test_deselect_is_idempotent(
        units in unit_strategy(),
        rect in rect_strategy(),
    ) {
        let mut registry = registry_from(&units);
        SelectionEngine::select(&mut registry, RED, |_| true, SelectMode::ClearAndSelect);

        let filter = UnitFilter::in_area(rect);
        SelectionEngine::deselect(&mut registry, RED, |u| filter.matches(u));
        let once = registry.selection(RED);
        let change = SelectionEngine::deselect(&mut registry, RED, |u| filter.matches(u));

        prop_assert!(change.is_noop());
        prop_assert_eq!(registry.selection(RED), once);
    }

    #[test]
    fn test_group_ops_preserve_invariants(
        units in unit_strategy(),
        ops in prop::collection::vec((0u8..5, 1u32..6, rect_strategy()), 0..30),
    ) {
        let mut registry = registry_from(&units);
        for (op, group, rect) in ops {
            let filter = UnitFilter::in_area(rect);
            match op {
                0 | 1 => {
                    let mode = if op == 0 {
                        SelectMode::ClearAndSelect
                    } else {
                        SelectMode::AddToSelection
                    };
                    SelectionEngine::select(&mut registry, RED, |u| filter.matches(u), mode);
                }
                2 => {
                    GroupManager::assign(&mut registry, RED, GroupId(group));
                }
                3 => {
                    GroupManager::dismiss(&mut registry, RED, GroupId(group));
                }
                _ => {
                    GroupManager::disband(&mut registry, RED, GroupId(group));
                }
            }
            prop_assert_eq!(registry.check_invariants(), Ok(()));
        }
        prop_assert!(registry.owned_by(BLUE).all(|u| u.group().is_none() && !u.is_selected()));
    }

    #[test]
    fn test_disband_then_assign_yields_fresh_identity(
        units in unit_strategy(),
        group in 1u32..100,
    ) {
        let mut registry = registry_from(&units);
        SelectionEngine::select(&mut registry, RED, |_| true, SelectMode::ClearAndSelect);
        prop_assume!(!registry.selection(RED).is_empty());

        GroupManager::assign(&mut registry, RED, GroupId(group));
        let first = registry.group(RED, GroupId(group)).unwrap().generation;
        let members = registry.group_members(RED, GroupId(group));

        GroupManager::disband(&mut registry, RED, GroupId(group));
        GroupManager::assign(&mut registry, RED, GroupId(group));

        let second = registry.group(RED, GroupId(group)).unwrap();
        prop_assert_ne!(second.generation, first);
        prop_assert_eq!(registry.group_members(RED, GroupId(group)), members);
    }
}
