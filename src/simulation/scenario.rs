//! Scenario files - scripted matches loaded from JSON
//!
//! ```json
//! {
//!   "players": [1, 2],
//!   "units": [{"id": 1, "owner": 1, "vehicle_type": "TANK", "x": 10.0, "y": 20.0}],
//!   "facilities": [{"id": 1, "kind": "CONTROL_CENTER", "owner": 1}],
//!   "ticks": [{"tick": 1, "submissions": [{"player": 1, "action": "ASSIGN", "group": 3}]}]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::admission::{Facility, FacilityTable};
use crate::command::Submission;
use crate::core::config::GameRules;
use crate::core::error::Result;
use crate::core::types::{PlayerId, Tick, UnitId, Vec2, VehicleType};
use crate::simulation::tick::Simulation;
use crate::units::{Unit, UnitRegistry};

/// A unit present at the start of the match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: UnitId,
    pub owner: PlayerId,
    pub vehicle_type: VehicleType,
    pub x: f64,
    pub y: f64,
}

impl From<&UnitSpec> for Unit {
    fn from(spec: &UnitSpec) -> Self {
        Unit::new(spec.id, spec.owner, spec.vehicle_type, Vec2::new(spec.x, spec.y))
    }
}

/// Submissions delivered in one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedTick {
    pub tick: Tick,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub players: Vec<PlayerId>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub ticks: Vec<ScriptedTick>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut scenario: Scenario = serde_json::from_str(json)?;
        scenario.ticks = merge_ticks(std::mem::take(&mut scenario.ticks));
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn registry(&self) -> Result<UnitRegistry> {
        let mut registry = UnitRegistry::new();
        for spec in &self.units {
            registry.spawn(Unit::from(spec))?;
        }
        Ok(registry)
    }

    pub fn facility_table(&self) -> FacilityTable {
        self.facilities.iter().copied().collect()
    }

    /// Build a simulation with every listed player registered
    pub fn simulation(&self, rules: GameRules) -> Result<Simulation> {
        let mut simulation = Simulation::new(rules, self.registry()?);
        for &player in &self.players {
            simulation.add_player(player);
        }
        Ok(simulation)
    }

    /// Last scripted tick, if any
    pub fn last_tick(&self) -> Option<Tick> {
        self.ticks.last().map(|t| t.tick)
    }
}

/// Sort scripted ticks and fold entries sharing a tick into one, keeping
/// file order among their submissions
fn merge_ticks(mut ticks: Vec<ScriptedTick>) -> Vec<ScriptedTick> {
    ticks.sort_by_key(|t| t.tick);
    let mut merged: Vec<ScriptedTick> = Vec::with_capacity(ticks.len());
    for entry in ticks {
        match merged.last_mut() {
            Some(last) if last.tick == entry.tick => {
                tracing::debug!(tick = entry.tick, "merging repeated scenario tick");
                last.submissions.extend(entry.submissions);
            }
            _ => merged.push(entry),
        }
    }
    merged
}
