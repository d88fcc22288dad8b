//! Outbound effects pushed to the physics and production collaborators

use serde::{Deserialize, Serialize};

use crate::core::types::{FacilityId, PlayerId, UnitId, VehicleType};

/// Movement request for the current selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementOrder {
    /// Move by the displacement `(x, y)`
    Move {
        x: f64,
        y: f64,
        max_speed: Option<f64>,
    },
    /// Rotate by `angle` radians about the pivot `(x, y)`
    Rotate {
        x: f64,
        y: f64,
        angle: f64,
        max_speed: Option<f64>,
        max_angular_speed: Option<f64>,
    },
    /// Scale distances to the pivot `(x, y)` by `factor`
    Scale {
        x: f64,
        y: f64,
        factor: f64,
        max_speed: Option<f64>,
    },
}

/// An effect handed to a collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Movement {
        player: PlayerId,
        units: Vec<UnitId>,
        order: MovementOrder,
    },
    Production {
        player: PlayerId,
        facility: FacilityId,
        vehicle_type: Option<VehicleType>,
    },
    NuclearStrike {
        player: PlayerId,
        guide: UnitId,
        x: f64,
        y: f64,
    },
}

/// Receiver of resolved effects (physics, facility production and strikes)
pub trait EffectSink {
    fn movement(&mut self, player: PlayerId, units: &[UnitId], order: &MovementOrder);

    /// `vehicle_type == None` stops production at the factory
    fn production(
        &mut self,
        player: PlayerId,
        facility: FacilityId,
        vehicle_type: Option<VehicleType>,
    );

    /// Strike at `(x, y)`; `guide` has already been checked to belong to `player`
    fn nuclear_strike(&mut self, player: PlayerId, guide: UnitId, x: f64, y: f64);
}

/// Records effects in order instead of executing them
#[derive(Debug, Clone, Default)]
pub struct EffectLog {
    effects: Vec<Effect>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Take all recorded effects, leaving the log empty
    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

impl EffectSink for EffectLog {
    fn movement(&mut self, player: PlayerId, units: &[UnitId], order: &MovementOrder) {
        self.effects.push(Effect::Movement {
            player,
            units: units.to_vec(),
            order: *order,
        });
    }

    fn production(
        &mut self,
        player: PlayerId,
        facility: FacilityId,
        vehicle_type: Option<VehicleType>,
    ) {
        self.effects.push(Effect::Production {
            player,
            facility,
            vehicle_type,
        });
    }

    fn nuclear_strike(&mut self, player: PlayerId, guide: UnitId, x: f64, y: f64) {
        self.effects.push(Effect::NuclearStrike { player, guide, x, y });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_log_records_and_drains() {
        let mut log = EffectLog::new();
        let order = MovementOrder::Move { x: 1.0, y: 0.0, max_speed: None };
        log.movement(PlayerId(1), &[UnitId(1), UnitId(2)], &order);
        log.production(PlayerId(1), FacilityId(4), None);
        log.nuclear_strike(PlayerId(1), UnitId(2), 30.0, 40.0);

        assert_eq!(log.len(), 3);
        let drained = log.drain();
        assert!(log.is_empty());
        assert_eq!(
            drained[0],
            Effect::Movement {
                player: PlayerId(1),
                units: vec![UnitId(1), UnitId(2)],
                order,
            }
        );
        assert_eq!(
            drained[2],
            Effect::NuclearStrike {
                player: PlayerId(1),
                guide: UnitId(2),
                x: 30.0,
                y: 40.0,
            }
        );
    }

    #[test]
    fn test_movement_order_json_tag() {
        let order = MovementOrder::Scale { x: 0.0, y: 0.0, factor: 0.5, max_speed: None };
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"kind\":\"scale\""));
    }
}
