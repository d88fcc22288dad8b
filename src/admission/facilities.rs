//! Read-only facility view pulled from the facility manager each tick

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{FacilityId, FacilityType, PlayerId};

/// A capturable map facility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub kind: FacilityType,
    /// Controlling player, `None` while neutral
    pub owner: Option<PlayerId>,
}

impl Facility {
    pub fn new(id: FacilityId, kind: FacilityType, owner: Option<PlayerId>) -> Self {
        Self { id, kind, owner }
    }
}

/// Facility information the command core needs from the facility manager
pub trait FacilityDirectory {
    fn facility(&self, id: FacilityId) -> Option<Facility>;

    /// Number of facilities of `kind` currently controlled by `player`
    fn controlled_count(&self, player: PlayerId, kind: FacilityType) -> u32;
}

/// In-memory facility table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityTable {
    facilities: BTreeMap<FacilityId, Facility>,
}

impl FacilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, facility: Facility) {
        self.facilities.insert(facility.id, facility);
    }

    /// Change control of a facility. Returns false if it does not exist.
    pub fn set_owner(&mut self, id: FacilityId, owner: Option<PlayerId>) -> bool {
        match self.facilities.get_mut(&id) {
            Some(facility) => {
                facility.owner = owner;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Facility> + '_ {
        self.facilities.values()
    }
}

impl FromIterator<Facility> for FacilityTable {
    fn from_iter<I: IntoIterator<Item = Facility>>(iter: I) -> Self {
        let mut table = FacilityTable::new();
        for facility in iter {
            table.insert(facility);
        }
        table
    }
}

impl FacilityDirectory for FacilityTable {
    fn facility(&self, id: FacilityId) -> Option<Facility> {
        self.facilities.get(&id).copied()
    }

    fn controlled_count(&self, player: PlayerId, kind: FacilityType) -> u32 {
        self.facilities
            .values()
            .filter(|f| f.kind == kind && f.owner == Some(player))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controlled_count_by_kind_and_owner() {
        let table: FacilityTable = [
            Facility::new(FacilityId(1), FacilityType::ControlCenter, Some(PlayerId(1))),
            Facility::new(FacilityId(2), FacilityType::ControlCenter, Some(PlayerId(2))),
            Facility::new(FacilityId(3), FacilityType::VehicleFactory, Some(PlayerId(1))),
            Facility::new(FacilityId(4), FacilityType::ControlCenter, None),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.controlled_count(PlayerId(1), FacilityType::ControlCenter), 1);
        assert_eq!(table.controlled_count(PlayerId(1), FacilityType::VehicleFactory), 1);
        assert_eq!(table.controlled_count(PlayerId(3), FacilityType::ControlCenter), 0);
    }

    #[test]
    fn test_set_owner_captures() {
        let mut table = FacilityTable::new();
        table.insert(Facility::new(FacilityId(1), FacilityType::ControlCenter, None));

        assert!(table.set_owner(FacilityId(1), Some(PlayerId(2))));
        assert!(!table.set_owner(FacilityId(9), Some(PlayerId(2))));
        assert_eq!(table.facility(FacilityId(1)).unwrap().owner, Some(PlayerId(2)));
    }
}
