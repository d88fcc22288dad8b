//! Unit entity as seen by the command core

use serde::{Deserialize, Serialize};

use crate::core::types::{GroupId, PlayerId, UnitId, VehicleType, Vec2};

/// A single vehicle
///
/// Owner and type are fixed for the unit's lifetime. Selection and group
/// membership are only changed through [`UnitRegistry`](super::UnitRegistry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub vehicle_type: VehicleType,
    pub position: Vec2,
    pub(super) group: Option<GroupId>,
    pub(super) selected: bool,
}

impl Unit {
    /// Create a fresh, unselected and ungrouped unit
    pub fn new(id: UnitId, owner: PlayerId, vehicle_type: VehicleType, position: Vec2) -> Self {
        Self {
            id,
            owner,
            vehicle_type,
            position,
            group: None,
            selected: false,
        }
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Selection flag, meaningful only from the owner's point of view
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_unit_is_idle() {
        let unit = Unit::new(UnitId(1), PlayerId(1), VehicleType::Tank, Vec2::new(3.0, 4.0));
        assert!(!unit.is_selected());
        assert_eq!(unit.group(), None);
        assert!(unit.is_owned_by(PlayerId(1)));
        assert!(!unit.is_owned_by(PlayerId(2)));
    }
}
