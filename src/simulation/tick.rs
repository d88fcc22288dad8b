//! Tick driver - feeds one tick's submissions through the dispatcher
//!
//! Players are processed in ascending id order so a tick is reproducible
//! regardless of the order submissions arrived in.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::admission::FacilityDirectory;
use crate::command::{
    ActionDispatcher, ActionRecord, DispatchOutcome, DispatchReport, EffectSink, MoveParams,
    Submission,
};
use crate::core::config::GameRules;
use crate::core::types::{PlayerId, Tick};
use crate::units::{RegistrySnapshot, UnitRegistry};

/// Everything that happened in one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    /// One report per dispatch, players ascending
    pub reports: Vec<DispatchReport>,
}

impl TickReport {
    pub fn applied(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_applied()).count()
    }

    pub fn ignored(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_ignored()).count()
    }

    pub fn idle(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome == DispatchOutcome::Idle)
            .count()
    }

    /// Reports for one player
    pub fn for_player(&self, player: PlayerId) -> impl Iterator<Item = &DispatchReport> + '_ {
        self.reports.iter().filter(move |r| r.player == player)
    }
}

/// Owns the unit registry and the dispatcher for a match
#[derive(Debug)]
pub struct Simulation {
    registry: UnitRegistry,
    dispatcher: ActionDispatcher,
    players: BTreeSet<PlayerId>,
    current_tick: Option<Tick>,
}

impl Simulation {
    pub fn new(rules: GameRules, registry: UnitRegistry) -> Self {
        let players = registry.players().into_iter().collect();
        Self {
            registry,
            dispatcher: ActionDispatcher::new(rules),
            players,
            current_tick: None,
        }
    }

    /// Register a player that may not own any units yet
    pub fn add_player(&mut self, player: PlayerId) {
        self.players.insert(player);
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().copied()
    }

    pub fn rules(&self) -> &GameRules {
        self.dispatcher.rules()
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Last tick passed to [`Simulation::run_tick`]
    pub fn current_tick(&self) -> Option<Tick> {
        self.current_tick
    }

    /// Dispatch every player's submission for `tick`.
    ///
    /// Known players with no submission act as NONE. A player's first
    /// submission is the one dispatched; later ones in the same tick come
    /// back as duplicates.
    ///
    /// A tick that does not advance past the last one is still run. Players
    /// who already dispatched at or after it get every submission back as a
    /// duplicate, and the current tick never moves backwards.
    pub fn run_tick(
        &mut self,
        tick: Tick,
        submissions: Vec<Submission>,
        facilities: &dyn FacilityDirectory,
        effects: &mut dyn EffectSink,
    ) -> TickReport {
        match self.current_tick {
            Some(last) if tick <= last => {
                tracing::warn!(tick, last, "tick does not advance");
            }
            _ => self.current_tick = Some(tick),
        }

        let mut by_player: BTreeMap<PlayerId, Vec<MoveParams>> = self
            .players
            .iter()
            .map(|&p| (p, Vec::new()))
            .collect();
        for submission in submissions {
            self.players.insert(submission.player);
            by_player
                .entry(submission.player)
                .or_default()
                .push(submission.params);
        }

        let mut report = TickReport {
            tick,
            reports: Vec::with_capacity(by_player.len()),
        };

        for (player, queued) in by_player {
            if queued.is_empty() {
                let idle = self.dispatch(player, tick, MoveParams::none(), facilities, effects);
                report.reports.push(idle);
                continue;
            }
            for params in queued {
                report
                    .reports
                    .push(self.dispatch(player, tick, params, facilities, effects));
            }
        }

        tracing::debug!(
            tick,
            applied = report.applied(),
            ignored = report.ignored(),
            idle = report.idle(),
            "tick complete"
        );
        report
    }

    fn dispatch(
        &mut self,
        player: PlayerId,
        tick: Tick,
        params: MoveParams,
        facilities: &dyn FacilityDirectory,
        effects: &mut dyn EffectSink,
    ) -> DispatchReport {
        let record = ActionRecord::new(player, tick, params);
        self.dispatcher
            .dispatch(&record, &mut self.registry, facilities, effects)
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot(self.current_tick.unwrap_or(0))
    }
}
