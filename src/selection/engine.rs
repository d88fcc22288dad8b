//! Selection engine - CLEAR_AND_SELECT, ADD_TO_SELECTION and DESELECT
//!
//! Only units owned by the acting player are ever inspected. Other players'
//! units are excluded before any predicate runs.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId};
use crate::units::{Unit, UnitRegistry};

/// How matched units combine with the existing selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectMode {
    /// Drop the current selection, then select the matches
    ClearAndSelect,
    /// Keep the current selection and add the matches
    AddToSelection,
}

/// Effect of one selection operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChange {
    /// Own units that satisfied the predicate
    pub matched: usize,
    pub newly_selected: usize,
    pub deselected: usize,
}

impl SelectionChange {
    pub fn is_noop(&self) -> bool {
        self.newly_selected == 0 && self.deselected == 0
    }
}

/// Applies selection actions through the registry
pub struct SelectionEngine;

impl SelectionEngine {
    /// Select `player`'s units matching `predicate` according to `mode`
    pub fn select<P>(
        registry: &mut UnitRegistry,
        player: PlayerId,
        predicate: P,
        mode: SelectMode,
    ) -> SelectionChange
    where
        P: Fn(&Unit) -> bool,
    {
        let before = registry.selection(player);
        let matches = matching_own_units(registry, player, &predicate);

        let mut change = SelectionChange {
            matched: matches.len(),
            ..SelectionChange::default()
        };

        if mode == SelectMode::ClearAndSelect {
            registry.clear_selection(player);
            change.deselected = before
                .iter()
                .filter(|id| matches.binary_search(*id).is_err())
                .count();
        }

        for &id in &matches {
            if set_flag(registry, player, id, true) && before.binary_search(&id).is_err() {
                change.newly_selected += 1;
            }
        }

        tracing::trace!(%player, ?mode, ?change, "select");
        change
    }

    /// Deselect `player`'s selected units matching `predicate`
    pub fn deselect<P>(
        registry: &mut UnitRegistry,
        player: PlayerId,
        predicate: P,
    ) -> SelectionChange
    where
        P: Fn(&Unit) -> bool,
    {
        let matches: Vec<UnitId> = registry
            .owned_by(player)
            .filter(|u| u.is_selected() && predicate(*u))
            .map(|u| u.id)
            .collect();

        let mut change = SelectionChange {
            matched: matches.len(),
            ..SelectionChange::default()
        };
        for id in matches {
            if set_flag(registry, player, id, false) {
                change.deselected += 1;
            }
        }

        tracing::trace!(%player, ?change, "deselect");
        change
    }
}

/// Sorted ids of `player`'s units satisfying `predicate`
fn matching_own_units<P>(registry: &UnitRegistry, player: PlayerId, predicate: &P) -> Vec<UnitId>
where
    P: Fn(&Unit) -> bool,
{
    registry
        .owned_by(player)
        .filter(|u| predicate(*u))
        .map(|u| u.id)
        .collect()
}

fn set_flag(registry: &mut UnitRegistry, player: PlayerId, id: UnitId, selected: bool) -> bool {
    match registry.set_selected(player, id, selected) {
        Ok(changed) => changed,
        Err(err) => {
            debug_assert!(false, "selection touched a unit it does not own: {err}");
            false
        }
    }
}
