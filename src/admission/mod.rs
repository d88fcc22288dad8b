//! Action admission - per-player sliding-window rate limiting

pub mod facilities;
pub mod limiter;

pub use facilities::{Facility, FacilityDirectory, FacilityTable};
pub use limiter::ActionRateLimiter;
