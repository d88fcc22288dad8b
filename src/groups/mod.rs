//! Groups - named per-player unit sets

pub mod manager;

pub use manager::{GroupChange, GroupManager};
