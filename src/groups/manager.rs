//! Group manager - ASSIGN, DISMISS and DISBAND
//!
//! A unit belongs to at most one group. ASSIGN onto a unit that is already
//! in another group moves it; the old group keeps its remaining members.

use serde::{Deserialize, Serialize};

use crate::core::types::{GroupId, PlayerId, UnitId};
use crate::units::UnitRegistry;

/// Effect of one group operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChange {
    /// Units whose membership changed
    pub affected: usize,
    /// Units taken out of a different group by ASSIGN
    pub moved_from_other: usize,
}

impl GroupChange {
    pub fn is_noop(&self) -> bool {
        self.affected == 0
    }
}

/// Applies group actions through the registry
pub struct GroupManager;

impl GroupManager {
    /// Put every selected unit of `player` into `group`
    pub fn assign(registry: &mut UnitRegistry, player: PlayerId, group: GroupId) -> GroupChange {
        let mut change = GroupChange::default();

        for id in registry.selection(player) {
            match registry.assign_to_group(player, id, group) {
                Ok(Some(previous)) if previous == group => {}
                Ok(Some(_)) => {
                    change.affected += 1;
                    change.moved_from_other += 1;
                }
                Ok(None) => change.affected += 1,
                Err(err) => debug_assert!(false, "assign touched a foreign unit: {err}"),
            }
        }

        debug_assert_eq!(registry.check_invariants(), Ok(()));
        tracing::trace!(%player, %group, ?change, "assign");
        change
    }

    /// Take every selected unit of `player` that is in `group` out of it
    pub fn dismiss(registry: &mut UnitRegistry, player: PlayerId, group: GroupId) -> GroupChange {
        let members: Vec<UnitId> = registry
            .owned_by(player)
            .filter(|u| u.is_selected() && u.group() == Some(group))
            .map(|u| u.id)
            .collect();

        let mut change = GroupChange::default();
        for id in members {
            match registry.clear_group(player, id) {
                Ok(Some(_)) => change.affected += 1,
                Ok(None) => {}
                Err(err) => debug_assert!(false, "dismiss touched a foreign unit: {err}"),
            }
        }

        debug_assert_eq!(registry.check_invariants(), Ok(()));
        tracing::trace!(%player, %group, ?change, "dismiss");
        change
    }

    /// Remove `player`'s `group`, freeing the id. Missing groups are a no-op.
    pub fn disband(registry: &mut UnitRegistry, player: PlayerId, group: GroupId) -> GroupChange {
        let change = match registry.disband_group(player, group) {
            Some(removed) => GroupChange {
                affected: removed.len(),
                moved_from_other: 0,
            },
            None => GroupChange::default(),
        };

        debug_assert_eq!(registry.check_invariants(), Ok(()));
        tracing::trace!(%player, %group, ?change, "disband");
        change
    }
}
