//! Command pipeline
//!
//! Converts a player's raw submission into state changes:
//! ActionRecord -> admission -> validate -> Command -> apply -> DispatchReport

pub mod action;
pub mod dispatcher;
pub mod effects;
pub mod params;

pub use action::{ActionRecord, ActionType, MoveParams, Submission};
pub use dispatcher::{
    ActionDispatcher, AppliedEffect, DispatchOutcome, DispatchReport, IgnoreReason,
};
pub use effects::{Effect, EffectLog, EffectSink, MovementOrder};
pub use params::{validate, Command, ParamError};
