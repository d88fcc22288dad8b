//! Post-tick registry snapshot consumed by replay and visualization

use serde::{Deserialize, Serialize};

use crate::core::types::{GroupId, PlayerId, Tick, UnitId, VehicleType, Vec2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub owner: PlayerId,
    pub vehicle_type: VehicleType,
    pub position: Vec2,
    pub selected: bool,
    pub group: Option<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub id: GroupId,
    pub owner: PlayerId,
    pub generation: u64,
    pub members: Vec<UnitId>,
}

/// Consistent view of selection and grouping after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub tick: Tick,
    pub units: Vec<UnitView>,
    pub groups: Vec<GroupView>,
}

impl RegistrySnapshot {
    /// Sorted ids selected by `player` at snapshot time
    pub fn selection_of(&self, player: PlayerId) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.owner == player && u.selected)
            .map(|u| u.id)
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
