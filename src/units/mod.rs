//! Unit registry - units, per-player selection and groups

pub mod registry;
pub mod snapshot;
pub mod unit;

pub use registry::{Group, UnitRegistry};
pub use snapshot::{GroupView, RegistrySnapshot, UnitView};
pub use unit::Unit;
