//! Simulation - tick driver and scripted scenarios

pub mod scenario;
pub mod tick;

pub use scenario::{Scenario, ScriptedTick, UnitSpec};
pub use tick::{Simulation, TickReport};
