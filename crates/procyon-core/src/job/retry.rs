//! Failed-job retry policies.
//!
//! A `RetryPolicy` is built once from an activity's retry configuration and
//! then consulted by the job scheduler on every failure. Two modes:
//! - **Static**: a retry count and a list of intervals, either of which may
//!   be absent and fall back to [`RetryDefaults`]
//! - **Dynamic**: an expression the caller evaluates in the failing job's
//!   variable scope; the resulting text is parsed into a static policy
//!
//! Failure counts are 1-based: the first failure of a job is failure 1.

use chrono::{DateTime, TimeDelta, Utc};
use procyon_types::config::JobRetryConfig;

use super::duration::{parse_duration, parse_repeating_interval};
use crate::condition::expression::is_expression;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from parsing or resolving retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryPolicyError {
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("retry expression '{expression}' resolved to another expression: '{resolved}'")]
    NestedExpression { expression: String, resolved: String },

    #[error("retry expression '{expression}' resolved to an empty retry cycle")]
    EmptyResolution { expression: String },

    #[error("retry expression '{expression}' could not be evaluated: {message}")]
    Evaluation { expression: String, message: String },
}

// ---------------------------------------------------------------------------
// RetryDefaults
// ---------------------------------------------------------------------------

/// Values used when a static policy leaves count or intervals unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDefaults {
    pub retries: u32,
    pub interval: TimeDelta,
}

impl RetryDefaults {
    pub fn new(retries: u32, interval: TimeDelta) -> Self {
        Self { retries, interval }
    }

    /// Parse the `[job_retry]` configuration section.
    pub fn from_config(config: &JobRetryConfig) -> Result<Self, RetryPolicyError> {
        Ok(Self {
            retries: config.default_retries,
            interval: parse_duration(&config.default_retry_interval)?,
        })
    }
}

impl Default for RetryDefaults {
    fn default() -> Self {
        Self {
            retries: 3,
            interval: TimeDelta::minutes(5),
        }
    }
}

// ---------------------------------------------------------------------------
// RetryDecision
// ---------------------------------------------------------------------------

/// What the scheduler should do after a job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision<'a> {
    /// Retry after `delay`; `remaining_retries` more failures are tolerated.
    RetryAfter {
        delay: TimeDelta,
        remaining_retries: u32,
    },
    /// No retries left.
    Exhausted,
    /// Dynamic policy: evaluate this expression and resolve the policy first.
    Evaluate(&'a str),
}

impl RetryDecision<'_> {
    /// Due date of the next attempt, if a retry is scheduled.
    pub fn due_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RetryDecision::RetryAfter { delay, .. } => now.checked_add_signed(*delay),
            RetryDecision::Exhausted | RetryDecision::Evaluate(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Immutable retry policy of an activity's failed jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryPolicy {
    Static {
        retries: Option<u32>,
        intervals: Option<Vec<TimeDelta>>,
    },
    Dynamic {
        expression: String,
    },
}

impl RetryPolicy {
    /// Static policy from a count and intervals; either may be absent.
    pub fn fixed(retries: Option<u32>, intervals: Option<Vec<TimeDelta>>) -> Self {
        RetryPolicy::Static { retries, intervals }
    }

    /// Dynamic policy; the expression is stored, never evaluated here.
    pub fn from_expression(expression: impl Into<String>) -> Self {
        RetryPolicy::Dynamic {
            expression: expression.into(),
        }
    }

    /// Parse a retry cycle as written in process models.
    ///
    /// - blank -> `Ok(None)`
    /// - `${...}` / `#{...}` -> dynamic policy
    /// - `R<n>/<duration>` -> `n` retries with one interval
    /// - `d1,d2,...` -> one retry per listed interval
    pub fn parse(text: &str) -> Result<Option<Self>, RetryPolicyError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if is_expression(trimmed) {
            return Ok(Some(Self::from_expression(trimmed)));
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if let [single] = parts.as_slice() {
            if let Some(repeat) = parse_repeating_interval(single)? {
                return Ok(Some(Self::fixed(
                    Some(repeat.repetitions),
                    Some(vec![repeat.interval]),
                )));
            }
        }

        let intervals = parts
            .iter()
            .map(|p| parse_duration(p))
            .collect::<Result<Vec<_>, _>>()?;
        let retries = u32::try_from(intervals.len()).unwrap_or(u32::MAX);
        Ok(Some(Self::fixed(Some(retries), Some(intervals))))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, RetryPolicy::Dynamic { .. })
    }

    pub fn expression(&self) -> Option<&str> {
        match self {
            RetryPolicy::Dynamic { expression } => Some(expression),
            RetryPolicy::Static { .. } => None,
        }
    }

    /// Decide what to do after failure number `failure_count`.
    ///
    /// Static policies are exhausted once `failure_count` exceeds the retry
    /// count. Otherwise failure `k` waits `intervals[min(k - 1, len - 1)]`
    /// (the last interval repeats), or the default interval when the list is
    /// absent or empty. A `failure_count` of 0 is treated as 1.
    pub fn next_delay(&self, failure_count: u32, defaults: &RetryDefaults) -> RetryDecision<'_> {
        let (retries, intervals) = match self {
            RetryPolicy::Dynamic { expression } => return RetryDecision::Evaluate(expression),
            RetryPolicy::Static { retries, intervals } => (
                retries.unwrap_or(defaults.retries),
                intervals.as_deref().unwrap_or_default(),
            ),
        };

        let failure = failure_count.max(1);
        if failure > retries {
            return RetryDecision::Exhausted;
        }

        let delay = match intervals.len() {
            0 => defaults.interval,
            len => intervals[(failure as usize - 1).min(len - 1)],
        };

        RetryDecision::RetryAfter {
            delay,
            remaining_retries: retries - failure,
        }
    }

    /// Delays for failures `failure_count..=retries`, in order.
    ///
    /// The first item is the delay before the next attempt; an empty schedule
    /// means the policy is exhausted. The schedule is produced lazily, so a
    /// large retry count costs nothing until it is consumed. Dynamic policies
    /// return `None`.
    pub fn next_delays(
        &self,
        failure_count: u32,
        defaults: &RetryDefaults,
    ) -> Option<impl Iterator<Item = TimeDelta> + '_> {
        if self.is_dynamic() {
            return None;
        }

        let defaults = *defaults;
        Some(
            (failure_count.max(1)..=u32::MAX).map_while(move |failure| {
                match self.next_delay(failure, &defaults) {
                    RetryDecision::RetryAfter { delay, .. } => Some(delay),
                    RetryDecision::Exhausted | RetryDecision::Evaluate(_) => None,
                }
            }),
        )
    }

    /// Turn a dynamic policy into a static one.
    ///
    /// `evaluate` receives the expression and returns the retry cycle text it
    /// yields in the failing job's scope. Static policies are returned
    /// unchanged without calling `evaluate`.
    pub fn resolve_with<F, E>(&self, evaluate: F) -> Result<RetryPolicy, RetryPolicyError>
    where
        F: FnOnce(&str) -> Result<String, E>,
        E: std::fmt::Display,
    {
        let RetryPolicy::Dynamic { expression } = self else {
            return Ok(self.clone());
        };

        let resolved = evaluate(expression).map_err(|e| RetryPolicyError::Evaluation {
            expression: expression.clone(),
            message: e.to_string(),
        })?;

        if is_expression(&resolved) {
            return Err(RetryPolicyError::NestedExpression {
                expression: expression.clone(),
                resolved,
            });
        }

        Self::parse(&resolved)?.ok_or_else(|| RetryPolicyError::EmptyResolution {
            expression: expression.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
