//! Conditional start event evaluation.
//!
//! - `expression` -- JEXL backend and variable scope
//! - `evaluator` -- one condition against one query, missing variables as false
//! - `resolver` -- candidate lookup by subscription or by definition
//! - `matcher` -- the two-branch entry point producing `MatchResult`s

pub mod error;
pub mod evaluator;
pub mod expression;
pub mod matcher;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ConditionError;
pub use evaluator::ConditionEvaluator;
pub use expression::{ExpressionBackend, JexlBackend};
pub use matcher::TriggerMatcher;
