//! Unit registry - sole owner of units and groups
//!
//! Every selection and group change goes through the primitives here, which
//! check ownership and keep the two views of group membership in step:
//! - `Unit::group` on the unit side
//! - `Group::members` on the group side

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::{CommandError, Result};
use crate::core::types::{GroupId, PlayerId, Tick, UnitId, Vec2};
use crate::units::snapshot::{GroupView, RegistrySnapshot, UnitView};
use crate::units::unit::Unit;

/// One incarnation of a player's group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub owner: PlayerId,
    /// Registry-wide counter value at creation; a disbanded and re-created
    /// group id gets a new generation
    pub generation: u64,
    members: BTreeSet<UnitId>,
}

impl Group {
    pub fn members(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.members.contains(&unit)
    }
}

/// Registry of all units and per-player groups
#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: BTreeMap<UnitId, Unit>,
    by_owner: AHashMap<PlayerId, BTreeSet<UnitId>>,
    groups: BTreeMap<(PlayerId, GroupId), Group>,
    next_generation: u64,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly produced unit; it always starts unselected and ungrouped
    pub fn spawn(&mut self, mut unit: Unit) -> Result<()> {
        if self.units.contains_key(&unit.id) {
            return Err(CommandError::DuplicateUnit(unit.id));
        }
        unit.group = None;
        unit.selected = false;

        tracing::trace!(unit = %unit.id, owner = %unit.owner, "spawn");
        self.by_owner.entry(unit.owner).or_default().insert(unit.id);
        self.units.insert(unit.id, unit);
        Ok(())
    }

    /// Remove a destroyed unit, detaching it from its group
    pub fn remove(&mut self, id: UnitId) -> Result<Unit> {
        let unit = self.units.remove(&id).ok_or(CommandError::UnknownUnit(id))?;
        if let Some(owned) = self.by_owner.get_mut(&unit.owner) {
            owned.remove(&id);
        }
        if let Some(group_id) = unit.group {
            if let Some(group) = self.groups.get_mut(&(unit.owner, group_id)) {
                group.members.remove(&id);
            }
        }
        tracing::trace!(unit = %id, "remove");
        Ok(unit)
    }

    /// Physics update of a unit's position
    pub fn set_position(&mut self, id: UnitId, position: Vec2) -> Result<()> {
        let unit = self.units.get_mut(&id).ok_or(CommandError::UnknownUnit(id))?;
        unit.position = position;
        Ok(())
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units owned by `player`, in ascending id order
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Unit> + '_ {
        self.by_owner
            .get(&player)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.units.get(id))
    }

    /// Players that currently own at least one unit, ascending
    pub fn players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self
            .by_owner
            .iter()
            .filter(|(_, owned)| !owned.is_empty())
            .map(|(player, _)| *player)
            .collect();
        players.sort();
        players
    }

    /// Sorted ids of the units `player` currently has selected
    pub fn selection(&self, player: PlayerId) -> Vec<UnitId> {
        self.owned_by(player)
            .filter(|u| u.selected)
            .map(|u| u.id)
            .collect()
    }

    fn owned_mut(&mut self, player: PlayerId, id: UnitId) -> Result<&mut Unit> {
        let unit = self.units.get_mut(&id).ok_or(CommandError::UnknownUnit(id))?;
        if unit.owner != player {
            return Err(CommandError::NotOwner {
                unit: id,
                owner: unit.owner,
                player,
            });
        }
        Ok(unit)
    }

    /// Set the selection flag of one of `player`'s units.
    /// Returns whether the flag changed.
    pub fn set_selected(&mut self, player: PlayerId, id: UnitId, selected: bool) -> Result<bool> {
        let unit = self.owned_mut(player, id)?;
        let changed = unit.selected != selected;
        unit.selected = selected;
        if changed {
            tracing::trace!(unit = %id, selected, "selection flag");
        }
        Ok(changed)
    }

    /// Deselect every unit owned by `player`. Returns how many were selected.
    pub fn clear_selection(&mut self, player: PlayerId) -> usize {
        let Some(owned) = self.by_owner.get(&player) else {
            return 0;
        };
        let mut cleared = 0;
        for id in owned {
            if let Some(unit) = self.units.get_mut(id) {
                if unit.selected {
                    unit.selected = false;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Put one of `player`'s units into `group`, leaving any previous group.
    /// Creates a new group incarnation when `group` does not exist yet.
    /// Returns the previous group, if any.
    pub fn assign_to_group(
        &mut self,
        player: PlayerId,
        id: UnitId,
        group: GroupId,
    ) -> Result<Option<GroupId>> {
        let unit = self.owned_mut(player, id)?;
        let previous = unit.group.replace(group);

        if let Some(old) = previous.filter(|old| *old != group) {
            if let Some(old_group) = self.groups.get_mut(&(player, old)) {
                old_group.members.remove(&id);
            }
        }

        let next_generation = &mut self.next_generation;
        let entry = self.groups.entry((player, group)).or_insert_with(|| {
            *next_generation += 1;
            Group {
                id: group,
                owner: player,
                generation: *next_generation,
                members: BTreeSet::new(),
            }
        });
        entry.members.insert(id);
        Ok(previous)
    }

    /// Clear the group membership of one of `player`'s units.
    /// Returns the group it left, if any.
    pub fn clear_group(&mut self, player: PlayerId, id: UnitId) -> Result<Option<GroupId>> {
        let unit = self.owned_mut(player, id)?;
        let previous = unit.group.take();
        if let Some(old) = previous {
            if let Some(group) = self.groups.get_mut(&(player, old)) {
                group.members.remove(&id);
            }
        }
        Ok(previous)
    }

    /// Remove `player`'s group entirely, clearing membership of its members.
    /// Returns the removed group, or `None` if it did not exist.
    pub fn disband_group(&mut self, player: PlayerId, group: GroupId) -> Option<Group> {
        let removed = self.groups.remove(&(player, group))?;
        for id in &removed.members {
            if let Some(unit) = self.units.get_mut(id) {
                debug_assert_eq!(unit.group, Some(group));
                unit.group = None;
            }
        }
        Some(removed)
    }

    pub fn group(&self, player: PlayerId, group: GroupId) -> Option<&Group> {
        self.groups.get(&(player, group))
    }

    /// Groups of `player`, ascending by id
    pub fn groups_of(&self, player: PlayerId) -> impl Iterator<Item = &Group> + '_ {
        self.groups
            .range((player, GroupId(0))..=(player, GroupId(u32::MAX)))
            .map(|(_, g)| g)
    }

    /// Sorted member ids of `player`'s group, empty if the group does not exist
    pub fn group_members(&self, player: PlayerId, group: GroupId) -> Vec<UnitId> {
        self.group(player, group)
            .map(|g| g.members().collect())
            .unwrap_or_default()
    }

    /// Verify that unit-side and group-side membership agree.
    /// A failure here is a bug in the registry or its callers.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        for unit in self.units.values() {
            if let Some(group_id) = unit.group {
                match self.groups.get(&(unit.owner, group_id)) {
                    Some(group) if group.members.contains(&unit.id) => {}
                    Some(_) => {
                        return Err(format!("{} claims {} but is not a member", unit.id, group_id))
                    }
                    None => return Err(format!("{} claims missing {}", unit.id, group_id)),
                }
            }
        }
        for ((owner, group_id), group) in &self.groups {
            for id in &group.members {
                let Some(unit) = self.units.get(id) else {
                    return Err(format!("{} of {} lists removed {}", group_id, owner, id));
                };
                if unit.owner != *owner {
                    return Err(format!("{} of {} lists foreign {}", group_id, owner, id));
                }
                if unit.group != Some(*group_id) {
                    return Err(format!("{} lists {} which claims {:?}", group_id, id, unit.group));
                }
            }
        }
        Ok(())
    }

    /// Read-only view for replay and visualization, taken after a tick
    pub fn snapshot(&self, tick: Tick) -> RegistrySnapshot {
        RegistrySnapshot {
            tick,
            units: self
                .units
                .values()
                .map(|u| UnitView {
                    id: u.id,
                    owner: u.owner,
                    vehicle_type: u.vehicle_type,
                    position: u.position,
                    selected: u.selected,
                    group: u.group,
                })
                .collect(),
            groups: self
                .groups
                .values()
                .map(|g| GroupView {
                    id: g.id,
                    owner: g.owner,
                    generation: g.generation,
                    members: g.members().collect(),
                })
                .collect(),
        }
    }
}
