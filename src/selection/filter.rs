//! Unit predicates used by selection actions

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::core::types::{GroupId, Rect, UnitId, VehicleType};
use crate::units::Unit;

/// Conjunction of optional unit conditions; an empty filter matches everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitFilter {
    pub area: Option<Rect>,
    pub vehicle_type: Option<VehicleType>,
    pub group: Option<GroupId>,
    pub ids: Option<RangeInclusive<UnitId>>,
}

impl UnitFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_area(area: Rect) -> Self {
        Self {
            area: Some(area),
            ..Self::default()
        }
    }

    pub fn in_group(group: GroupId) -> Self {
        Self {
            group: Some(group),
            ..Self::default()
        }
    }

    pub fn with_vehicle_type(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = Some(vehicle_type);
        self
    }

    pub fn with_ids(mut self, ids: RangeInclusive<UnitId>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn matches(&self, unit: &Unit) -> bool {
        if let Some(area) = &self.area {
            if !area.contains(unit.position) {
                return false;
            }
        }
        if let Some(vehicle_type) = self.vehicle_type {
            if unit.vehicle_type != vehicle_type {
                return false;
            }
        }
        if let Some(group) = self.group {
            if unit.group() != Some(group) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&unit.id) {
                return false;
            }
        }
        true
    }
}
