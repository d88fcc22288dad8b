//! Selection - per-player unit selection with strict ownership filtering

pub mod engine;
pub mod filter;

pub use engine::{SelectMode, SelectionChange, SelectionEngine};
pub use filter::UnitFilter;
