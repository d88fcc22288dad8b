//! Action dispatch - per-player, per-tick entry point
//!
//! Each submission walks the same path:
//! awaiting action -> admission checked -> applied | ignored -> recorded.
//!
//! NONE stops at the first step and is never recorded. Every other action
//! is recorded in the rate-limit window exactly once, whether it was
//! applied or ignored. Ignored actions leave no trace in unit state.

use ahash::AHashMap;
use serde::Serialize;

use crate::admission::{ActionRateLimiter, FacilityDirectory};
use crate::command::action::{ActionRecord, ActionType};
use crate::command::effects::EffectSink;
use crate::command::params::{validate, Command, ParamError};
use crate::core::config::GameRules;
use crate::core::types::{PlayerId, Tick};
use crate::groups::{GroupChange, GroupManager};
use crate::selection::{SelectionChange, SelectionEngine};
use crate::units::UnitRegistry;

/// Why an action had no effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IgnoreReason {
    /// Rate limit reached for the current window
    AdmissionDenied,
    /// Required parameters missing or invalid
    Malformed(ParamError),
    /// The player already submitted an action this tick
    DuplicateSubmission,
}

/// What an applied action changed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AppliedEffect {
    Selection(SelectionChange),
    Group(GroupChange),
    /// Number of selected units the movement order was forwarded for
    Movement { units: usize },
    Production,
    NuclearStrike,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DispatchOutcome {
    /// NONE or no submission
    Idle,
    Applied(AppliedEffect),
    Ignored(IgnoreReason),
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied(_))
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, DispatchOutcome::Ignored(_))
    }
}

/// Terminal state of one dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub player: PlayerId,
    pub tick: Tick,
    pub action: ActionType,
    pub outcome: DispatchOutcome,
    /// Whether the attempt was counted in the rate-limit window
    pub recorded: bool,
}

/// Admits, validates, applies and records player actions
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    rules: GameRules,
    limiter: ActionRateLimiter,
    last_dispatch: AHashMap<PlayerId, Tick>,
}

impl ActionDispatcher {
    pub fn new(rules: GameRules) -> Self {
        let limiter = ActionRateLimiter::new(&rules);
        Self {
            rules,
            limiter,
            last_dispatch: AHashMap::new(),
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn limiter(&self) -> &ActionRateLimiter {
        &self.limiter
    }

    /// Process one player's action for `record.tick`
    pub fn dispatch(
        &mut self,
        record: &ActionRecord,
        registry: &mut UnitRegistry,
        facilities: &dyn FacilityDirectory,
        effects: &mut dyn EffectSink,
    ) -> DispatchReport {
        let player = record.player;
        let tick = record.tick;
        let action = record.action();

        let report = |outcome, recorded| DispatchReport {
            player,
            tick,
            action,
            outcome,
            recorded,
        };

        // One action per player per tick; anything after the first is dropped uncounted
        if self.last_dispatch.get(&player).is_some_and(|&last| last >= tick) {
            tracing::debug!(%player, tick, ?action, "duplicate submission dropped");
            let outcome = DispatchOutcome::Ignored(IgnoreReason::DuplicateSubmission);
            return report(outcome, false);
        }
        self.last_dispatch.insert(player, tick);

        if action == ActionType::None {
            return report(DispatchOutcome::Idle, false);
        }

        let outcome = if !self.limiter.can_act(player, tick, facilities) {
            tracing::debug!(
                %player,
                tick,
                ?action,
                in_window = self.limiter.actions_in_window(player, tick),
                ceiling = self.limiter.ceiling(player, facilities),
                "admission denied"
            );
            DispatchOutcome::Ignored(IgnoreReason::AdmissionDenied)
        } else {
            match validate(&record.params, player, &self.rules, registry, facilities) {
                Ok(command) => DispatchOutcome::Applied(apply(command, player, registry, effects)),
                Err(err) => {
                    tracing::debug!(
                        %player,
                        tick,
                        ?action,
                        error = %err,
                        "malformed action ignored"
                    );
                    DispatchOutcome::Ignored(IgnoreReason::Malformed(err))
                }
            }
        };

        self.limiter.record_action(player, tick);
        tracing::debug!(%player, tick, ?action, ?outcome, "action recorded");
        report(outcome, true)
    }

    /// Ticks until `player` may act again, see [`ActionRateLimiter::remaining_cooldown`]
    pub fn remaining_cooldown(
        &self,
        player: PlayerId,
        tick: Tick,
        facilities: &dyn FacilityDirectory,
    ) -> Option<u64> {
        self.limiter.remaining_cooldown(player, tick, facilities)
    }

    /// Drop all per-player state, e.g. after elimination
    pub fn forget(&mut self, player: PlayerId) {
        self.limiter.forget(player);
        self.last_dispatch.remove(&player);
    }
}

fn apply(
    command: Command,
    player: PlayerId,
    registry: &mut UnitRegistry,
    effects: &mut dyn EffectSink,
) -> AppliedEffect {
    match command {
        Command::Select { mode, filter } => AppliedEffect::Selection(SelectionEngine::select(
            registry,
            player,
            |u| filter.matches(u),
            mode,
        )),
        Command::Deselect { filter } => AppliedEffect::Selection(SelectionEngine::deselect(
            registry,
            player,
            |u| filter.matches(u),
        )),
        Command::Assign(group) => {
            AppliedEffect::Group(GroupManager::assign(registry, player, group))
        }
        Command::Dismiss(group) => {
            AppliedEffect::Group(GroupManager::dismiss(registry, player, group))
        }
        Command::Disband(group) => {
            AppliedEffect::Group(GroupManager::disband(registry, player, group))
        }
        Command::Movement(order) => {
            let units = registry.selection(player);
            if !units.is_empty() {
                effects.movement(player, &units, &order);
            }
            AppliedEffect::Movement { units: units.len() }
        }
        Command::SetupProduction {
            facility,
            vehicle_type,
        } => {
            effects.production(player, facility, vehicle_type);
            AppliedEffect::Production
        }
        Command::NuclearStrike { x, y, guide } => {
            effects.nuclear_strike(player, guide, x, y);
            AppliedEffect::NuclearStrike
        }
    }
}
