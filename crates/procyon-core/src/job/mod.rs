//! Failed-job retry policy model.
//!
//! - `duration` -- ISO-8601 durations and `R<n>/<duration>` repeat cycles
//! - `retry` -- `RetryPolicy` (static or expression-driven) and the per-failure
//!   `RetryDecision`

pub mod duration;
pub mod retry;

pub use duration::{RepeatingInterval, parse_duration, parse_repeating_interval};
pub use retry::{RetryDecision, RetryDefaults, RetryPolicy, RetryPolicyError};
