//! Sliding-window action rate limiter
//!
//! A player may act at tick `T` when fewer than `ceiling` actions were
//! recorded in the ticks `T - W + 1 ..= T`, where `W` is
//! `action_detection_interval - 1`. The ceiling is recomputed from current
//! facility control on every query.

use ahash::AHashMap;
use std::collections::VecDeque;

use crate::admission::facilities::FacilityDirectory;
use crate::core::config::GameRules;
use crate::core::types::{FacilityType, PlayerId, Tick};

/// Per-player admission windows
#[derive(Debug, Clone)]
pub struct ActionRateLimiter {
    window_len: u64,
    base_action_count: u32,
    per_control_center: u32,
    windows: AHashMap<PlayerId, VecDeque<Tick>>,
}

impl ActionRateLimiter {
    pub fn new(rules: &GameRules) -> Self {
        Self {
            window_len: rules.window_len(),
            base_action_count: rules.base_action_count,
            per_control_center: rules.actions_per_control_center,
            windows: AHashMap::new(),
        }
    }

    pub fn window_len(&self) -> u64 {
        self.window_len
    }

    /// Actions allowed per window for `player` given current facility control
    pub fn ceiling(&self, player: PlayerId, facilities: &dyn FacilityDirectory) -> u32 {
        let centers = facilities.controlled_count(player, FacilityType::ControlCenter);
        self.base_action_count
            .saturating_add(centers.saturating_mul(self.per_control_center))
    }

    #[inline]
    fn in_window(&self, entry: Tick, tick: Tick) -> bool {
        entry <= tick && entry + self.window_len > tick
    }

    /// Recorded action ticks of `player` still inside the window at `tick`
    pub fn window_entries(&self, player: PlayerId, tick: Tick) -> Vec<Tick> {
        self.windows
            .get(&player)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&entry| self.in_window(entry, tick))
            .collect()
    }

    pub fn actions_in_window(&self, player: PlayerId, tick: Tick) -> usize {
        self.windows
            .get(&player)
            .map(|w| w.iter().filter(|&&entry| self.in_window(entry, tick)).count())
            .unwrap_or(0)
    }

    pub fn can_act(
        &self,
        player: PlayerId,
        tick: Tick,
        facilities: &dyn FacilityDirectory,
    ) -> bool {
        (self.actions_in_window(player, tick) as u64) < self.ceiling(player, facilities) as u64
    }

    /// Count an action attempt of `player` at `tick`.
    ///
    /// Callers record at most once per player per tick, with non-decreasing ticks.
    pub fn record_action(&mut self, player: PlayerId, tick: Tick) {
        let window_len = self.window_len;
        let window = self.windows.entry(player).or_default();
        while let Some(&oldest) = window.front() {
            if oldest + window_len > tick {
                break;
            }
            window.pop_front();
        }
        debug_assert!(window.back().map_or(true, |&last| last <= tick));
        window.push_back(tick);
        debug_assert!(window.len() as u64 <= window_len);
        tracing::trace!(%player, tick, in_window = window.len(), "action recorded");
    }

    /// Ticks until `player` may act again under current facility control.
    ///
    /// `Some(0)` means an action is admissible now; `None` means the ceiling
    /// is zero and no action can be admitted until control changes.
    pub fn remaining_cooldown(
        &self,
        player: PlayerId,
        tick: Tick,
        facilities: &dyn FacilityDirectory,
    ) -> Option<u64> {
        let ceiling = self.ceiling(player, facilities) as usize;
        if ceiling == 0 {
            return None;
        }
        let entries = self.window_entries(player, tick);
        if entries.len() < ceiling {
            return Some(0);
        }
        // Once this entry ages out the count drops below the ceiling
        let blocking = entries[entries.len() - ceiling];
        Some(blocking + self.window_len - tick)
    }

    /// Forget a player's history, e.g. after elimination
    pub fn forget(&mut self, player: PlayerId) {
        self.windows.remove(&player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::facilities::{Facility, FacilityTable};
    use crate::core::types::FacilityId;

    const P: PlayerId = PlayerId(1);

    fn rules(base: u32, interval: u64) -> GameRules {
        GameRules {
            base_action_count: base,
            action_detection_interval: interval,
            ..GameRules::default()
        }
    }

    fn centers(player: PlayerId, count: u64) -> FacilityTable {
        (0..count)
            .map(|i| Facility::new(FacilityId(i), FacilityType::ControlCenter, Some(player)))
            .collect()
    }

    #[test]
    fn test_ceiling_counts_control_centers() {
        let limiter = ActionRateLimiter::new(&rules(5, 6));
        assert_eq!(limiter.ceiling(P, &FacilityTable::new()), 5);
        assert_eq!(limiter.ceiling(P, &centers(P, 2)), 7);
        assert_eq!(limiter.ceiling(PlayerId(2), &centers(P, 2)), 5);
    }

    #[test]
    fn test_ceiling_uses_per_center_increment() {
        let mut r = rules(12, 60);
        r.actions_per_control_center = 3;
        let limiter = ActionRateLimiter::new(&r);
        assert_eq!(limiter.ceiling(P, &centers(P, 2)), 18);
    }

    #[test]
    fn test_window_denies_at_ceiling_and_reopens() {
        let facilities = FacilityTable::new();
        let mut limiter = ActionRateLimiter::new(&rules(5, 6));

        for tick in 1..=5 {
            assert!(limiter.can_act(P, tick, &facilities), "tick {tick}");
            limiter.record_action(P, tick);
        }
        // Five actions already inside ticks 1..=5
        assert!(!limiter.can_act(P, 5, &facilities));
        // Window at tick 6 covers 2..=6, tick 1 has aged out
        assert_eq!(limiter.actions_in_window(P, 6), 4);
        assert!(limiter.can_act(P, 6, &facilities));
    }

    #[test]
    fn test_window_never_exceeds_len() {
        let mut limiter = ActionRateLimiter::new(&rules(100, 6));
        for tick in 0..50 {
            limiter.record_action(P, tick);
            assert!(limiter.windows.get(&P).unwrap().len() as u64 <= limiter.window_len());
        }
        assert_eq!(limiter.window_entries(P, 49), vec![45, 46, 47, 48, 49]);
    }

    #[test]
    fn test_ceiling_change_applies_immediately() {
        let mut limiter = ActionRateLimiter::new(&rules(2, 11));
        let none = FacilityTable::new();
        let mut held = centers(P, 1);

        limiter.record_action(P, 1);
        limiter.record_action(P, 2);
        assert!(!limiter.can_act(P, 3, &none));
        assert!(limiter.can_act(P, 3, &held));

        held.set_owner(FacilityId(0), Some(PlayerId(9)));
        assert!(!limiter.can_act(P, 3, &held));
    }

    #[test]
    fn test_players_are_independent() {
        let facilities = FacilityTable::new();
        let mut limiter = ActionRateLimiter::new(&rules(1, 10));
        limiter.record_action(P, 1);
        assert!(!limiter.can_act(P, 2, &facilities));
        assert!(limiter.can_act(PlayerId(2), 2, &facilities));
    }

    #[test]
    fn test_remaining_cooldown() {
        let facilities = FacilityTable::new();
        let mut limiter = ActionRateLimiter::new(&rules(2, 6));
        assert_eq!(limiter.remaining_cooldown(P, 0, &facilities), Some(0));

        limiter.record_action(P, 1);
        limiter.record_action(P, 3);
        // Entry at tick 1 leaves the window at tick 6
        assert_eq!(limiter.remaining_cooldown(P, 3, &facilities), Some(3));
        assert!(!limiter.can_act(P, 5, &facilities));
        assert!(limiter.can_act(P, 6, &facilities));
        assert_eq!(limiter.remaining_cooldown(P, 6, &facilities), Some(0));
    }

    #[test]
    fn test_zero_ceiling_never_admits() {
        let facilities = FacilityTable::new();
        let limiter = ActionRateLimiter::new(&rules(0, 6));
        assert!(!limiter.can_act(P, 0, &facilities));
        assert_eq!(limiter.remaining_cooldown(P, 0, &facilities), None);
    }

    #[test]
    fn test_forget_resets_window() {
        let facilities = FacilityTable::new();
        let mut limiter = ActionRateLimiter::new(&rules(1, 10));
        limiter.record_action(P, 4);
        limiter.forget(P);
        assert!(limiter.can_act(P, 5, &facilities));
    }
}
