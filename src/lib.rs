//! Unit Command - action admission core for a tick-based strategy simulator
//!
//! Each tick every player submits at most one action. The dispatcher admits
//! it against a sliding-window rate limit, validates its parameters and
//! applies it to the player's own units: selection, control groups, or
//! movement and production orders forwarded to external collaborators.

pub mod admission;
pub mod command;
pub mod core;
pub mod groups;
pub mod selection;
pub mod simulation;
pub mod units;
