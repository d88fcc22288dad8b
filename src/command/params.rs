//! Parameter validation - turns raw move parameters into a command
//!
//! A submission whose required fields are missing or invalid is rejected
//! here with a [`ParamError`]; the dispatcher then ignores it silently.

use serde::Serialize;
use thiserror::Error;

use crate::admission::FacilityDirectory;
use crate::command::action::{ActionType, MoveParams};
use crate::command::effects::MovementOrder;
use crate::core::config::GameRules;
use crate::core::types::{
    FacilityId, FacilityType, GroupId, PlayerId, Rect, UnitId, VehicleType,
};
use crate::selection::{SelectMode, UnitFilter};
use crate::units::UnitRegistry;

/// Why a submission's parameters were rejected
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ParamError {
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),

    #[error("field `{0}` is not a finite number")]
    NonFinite(&'static str),

    #[error("selection rectangle is inverted")]
    InvertedRect,

    #[error("group {group} outside 1..={max}")]
    GroupOutOfRange { group: u32, max: u32 },

    #[error("scale factor {0} outside allowed range")]
    ScaleFactorOutOfRange(f64),

    #[error("field `{0}` must not be negative")]
    NegativeSpeed(&'static str),

    #[error("facility {0:?} does not exist")]
    UnknownFacility(FacilityId),

    #[error("facility {0:?} is not controlled by the acting player")]
    FacilityNotOwned(FacilityId),

    #[error("facility {0:?} is not a vehicle factory")]
    NotAVehicleFactory(FacilityId),

    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),

    #[error("unit {0} is not owned by the acting player")]
    NotOwner(UnitId),
}

/// A structurally valid action, ready to apply
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select { mode: SelectMode, filter: UnitFilter },
    Deselect { filter: UnitFilter },
    Assign(GroupId),
    Dismiss(GroupId),
    Disband(GroupId),
    Movement(MovementOrder),
    SetupProduction {
        facility: FacilityId,
        vehicle_type: Option<VehicleType>,
    },
    NuclearStrike {
        x: f64,
        y: f64,
        guide: UnitId,
    },
}

/// Validate `params` submitted by `player`.
///
/// NONE is not a command and is rejected as missing an action. The registry
/// and facility directory are only read, to check what the player controls.
pub fn validate(
    params: &MoveParams,
    player: PlayerId,
    rules: &GameRules,
    registry: &UnitRegistry,
    facilities: &dyn FacilityDirectory,
) -> Result<Command, ParamError> {
    match params.action {
        ActionType::None => Err(ParamError::MissingField("action")),
        ActionType::ClearAndSelect => Ok(Command::Select {
            mode: SelectMode::ClearAndSelect,
            filter: selection_filter(params, rules)?,
        }),
        ActionType::AddToSelection => Ok(Command::Select {
            mode: SelectMode::AddToSelection,
            filter: selection_filter(params, rules)?,
        }),
        ActionType::Deselect => Ok(Command::Deselect {
            filter: selection_filter(params, rules)?,
        }),
        ActionType::Assign => Ok(Command::Assign(required_group(params, rules)?)),
        ActionType::Dismiss => Ok(Command::Dismiss(required_group(params, rules)?)),
        ActionType::Disband => Ok(Command::Disband(required_group(params, rules)?)),
        ActionType::Move => Ok(Command::Movement(MovementOrder::Move {
            x: finite(params.x, "x")?,
            y: finite(params.y, "y")?,
            max_speed: speed(params.max_speed, "max_speed")?,
        })),
        ActionType::Rotate => Ok(Command::Movement(MovementOrder::Rotate {
            x: finite(params.x, "x")?,
            y: finite(params.y, "y")?,
            angle: finite(params.angle, "angle")?,
            max_speed: speed(params.max_speed, "max_speed")?,
            max_angular_speed: speed(params.max_angular_speed, "max_angular_speed")?,
        })),
        ActionType::Scale => {
            let x = finite(params.x, "x")?;
            let y = finite(params.y, "y")?;
            let factor = finite(params.factor, "factor")?;
            if factor < rules.min_scale_factor || factor > rules.max_scale_factor {
                return Err(ParamError::ScaleFactorOutOfRange(factor));
            }
            Ok(Command::Movement(MovementOrder::Scale {
                x,
                y,
                factor,
                max_speed: speed(params.max_speed, "max_speed")?,
            }))
        }
        ActionType::SetupVehicleProduction => {
            let id = params
                .facility_id
                .ok_or(ParamError::MissingField("facility_id"))?;
            let facility = facilities
                .facility(id)
                .ok_or(ParamError::UnknownFacility(id))?;
            if facility.kind != FacilityType::VehicleFactory {
                return Err(ParamError::NotAVehicleFactory(id));
            }
            if facility.owner != Some(player) {
                return Err(ParamError::FacilityNotOwned(id));
            }
            Ok(Command::SetupProduction {
                facility: id,
                vehicle_type: params.vehicle_type,
            })
        }
        ActionType::TacticalNuclearStrike => {
            let x = finite(params.x, "x")?;
            let y = finite(params.y, "y")?;
            let guide = params
                .vehicle_id
                .ok_or(ParamError::MissingField("vehicle_id"))?;
            let unit = registry.get(guide).ok_or(ParamError::UnknownUnit(guide))?;
            if unit.owner != player {
                return Err(ParamError::NotOwner(guide));
            }
            Ok(Command::NuclearStrike { x, y, guide })
        }
    }
}

fn finite(value: Option<f64>, field: &'static str) -> Result<f64, ParamError> {
    let value = value.ok_or(ParamError::MissingField(field))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParamError::NonFinite(field))
    }
}

fn speed(value: Option<f64>, field: &'static str) -> Result<Option<f64>, ParamError> {
    match value {
        None => Ok(None),
        Some(v) if !v.is_finite() => Err(ParamError::NonFinite(field)),
        Some(v) if v < 0.0 => Err(ParamError::NegativeSpeed(field)),
        Some(v) => Ok(Some(v)),
    }
}

/// `Some(group)` when a non-zero group was given, checked against the rules
fn optional_group(params: &MoveParams, rules: &GameRules) -> Result<Option<GroupId>, ParamError> {
    match params.group {
        None | Some(0) => Ok(None),
        Some(g) if g > rules.max_unit_group => Err(ParamError::GroupOutOfRange {
            group: g,
            max: rules.max_unit_group,
        }),
        Some(g) => Ok(Some(GroupId(g))),
    }
}

fn required_group(params: &MoveParams, rules: &GameRules) -> Result<GroupId, ParamError> {
    optional_group(params, rules)?.ok_or(ParamError::MissingField("group"))
}

/// Selection by group takes precedence; otherwise all four edges are required
fn selection_filter(params: &MoveParams, rules: &GameRules) -> Result<UnitFilter, ParamError> {
    let mut filter = match optional_group(params, rules)? {
        Some(group) => UnitFilter::in_group(group),
        None => {
            let rect = Rect::new(
                finite(params.left, "left")?,
                finite(params.top, "top")?,
                finite(params.right, "right")?,
                finite(params.bottom, "bottom")?,
            );
            if !rect.is_well_formed() {
                return Err(ParamError::InvertedRect);
            }
            UnitFilter::in_area(rect)
        }
    };
    filter.vehicle_type = params.vehicle_type;
    Ok(filter)
}
