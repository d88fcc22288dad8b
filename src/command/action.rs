//! Player actions and their raw move parameters

use serde::{Deserialize, Serialize};

use crate::core::types::{FacilityId, PlayerId, Rect, Tick, UnitId, VehicleType};

/// Every action a player can submit in a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Do nothing; never rate limited
    #[default]
    None,
    ClearAndSelect,
    AddToSelection,
    Deselect,
    Assign,
    Dismiss,
    Disband,
    Move,
    Rotate,
    Scale,
    SetupVehicleProduction,
    TacticalNuclearStrike,
}

impl ActionType {
    /// Selection actions operate on a unit predicate
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            ActionType::ClearAndSelect | ActionType::AddToSelection | ActionType::Deselect
        )
    }
}

/// Raw parameters accompanying an action, as submitted by the player.
///
/// Which fields are required depends on `action`; unused fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveParams {
    pub action: ActionType,
    /// Group id; `0` means no group
    pub group: Option<u32>,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub vehicle_type: Option<VehicleType>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub angle: Option<f64>,
    pub factor: Option<f64>,
    pub max_speed: Option<f64>,
    pub max_angular_speed: Option<f64>,
    pub facility_id: Option<FacilityId>,
    /// Guide unit for a nuclear strike
    pub vehicle_id: Option<UnitId>,
}

impl MoveParams {
    pub fn none() -> Self {
        Self::default()
    }

    fn of(action: ActionType) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    fn with_rect(mut self, rect: Rect) -> Self {
        self.left = Some(rect.left);
        self.top = Some(rect.top);
        self.right = Some(rect.right);
        self.bottom = Some(rect.bottom);
        self
    }

    pub fn clear_and_select(rect: Rect) -> Self {
        Self::of(ActionType::ClearAndSelect).with_rect(rect)
    }

    pub fn add_to_selection(rect: Rect) -> Self {
        Self::of(ActionType::AddToSelection).with_rect(rect)
    }

    pub fn deselect(rect: Rect) -> Self {
        Self::of(ActionType::Deselect).with_rect(rect)
    }

    /// CLEAR_AND_SELECT by group membership instead of area
    pub fn select_group(group: u32) -> Self {
        Self {
            group: Some(group),
            ..Self::of(ActionType::ClearAndSelect)
        }
    }

    pub fn assign(group: u32) -> Self {
        Self {
            group: Some(group),
            ..Self::of(ActionType::Assign)
        }
    }

    pub fn dismiss(group: u32) -> Self {
        Self {
            group: Some(group),
            ..Self::of(ActionType::Dismiss)
        }
    }

    pub fn disband(group: u32) -> Self {
        Self {
            group: Some(group),
            ..Self::of(ActionType::Disband)
        }
    }

    pub fn move_by(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::of(ActionType::Move)
        }
    }

    pub fn rotate(x: f64, y: f64, angle: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            angle: Some(angle),
            ..Self::of(ActionType::Rotate)
        }
    }

    pub fn scale(x: f64, y: f64, factor: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            factor: Some(factor),
            ..Self::of(ActionType::Scale)
        }
    }

    pub fn setup_production(facility: FacilityId, vehicle_type: Option<VehicleType>) -> Self {
        Self {
            facility_id: Some(facility),
            vehicle_type,
            ..Self::of(ActionType::SetupVehicleProduction)
        }
    }

    /// Strike `(x, y)`, spotted by the player's own unit `guide`
    pub fn nuclear_strike(x: f64, y: f64, guide: UnitId) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            vehicle_id: Some(guide),
            ..Self::of(ActionType::TacticalNuclearStrike)
        }
    }

    pub fn with_vehicle_type(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = Some(vehicle_type);
        self
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    pub fn with_max_angular_speed(mut self, max_angular_speed: f64) -> Self {
        self.max_angular_speed = Some(max_angular_speed);
        self
    }
}

/// One player's submission for a tick, as delivered by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub player: PlayerId,
    #[serde(flatten)]
    pub params: MoveParams,
}

impl Submission {
    pub fn new(player: PlayerId, params: MoveParams) -> Self {
        Self { player, params }
    }
}

/// A submission stamped with the tick it is processed in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub tick: Tick,
    pub params: MoveParams,
}

impl ActionRecord {
    pub fn new(player: PlayerId, tick: Tick, params: MoveParams) -> Self {
        Self { player, tick, params }
    }

    pub fn action(&self) -> ActionType {
        self.params.action
    }
}
