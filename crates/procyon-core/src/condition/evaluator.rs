//! Evaluation of a single conditional event against a query.

use std::sync::Arc;

use procyon_types::condition::ConditionQuery;
use procyon_types::definition::{ConditionalEventDefinition, ProcessDefinition};
use tracing::Span;

use super::expression::{
    Expression, ExpressionBackend, ExpressionError, ExpressionOutcome, VariableScope,
};

/// Evaluates conditional event definitions with an injected backend.
///
/// The span given at construction is the parent of the debug event emitted
/// when a condition references a variable the query does not provide.
#[derive(Clone)]
pub struct ConditionEvaluator {
    backend: Arc<dyn ExpressionBackend>,
    span: Span,
}

impl ConditionEvaluator {
    pub fn new(backend: Arc<dyn ExpressionBackend>) -> Self {
        Self {
            backend,
            span: tracing::debug_span!("condition_evaluator"),
        }
    }

    /// Use `span` as the parent of this evaluator's log events.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Decide whether `condition` fires for `query`.
    ///
    /// - true only if the expression is true and, when the condition names a
    ///   variable, that variable is among the query's variables
    /// - a reference to an absent variable yields `Ok(false)`
    /// - any other evaluation failure is returned as `Err`
    pub fn evaluate(
        &self,
        query: &ConditionQuery,
        process_definition: &ProcessDefinition,
        condition: &ConditionalEventDefinition,
    ) -> Result<bool, ExpressionError> {
        let scope = VariableScope::new(query.variables(), process_definition);
        let expression = Expression::new(&condition.expression);

        match self.backend.evaluate(&expression, &scope)? {
            ExpressionOutcome::Value(true) => Ok(condition
                .variable_name
                .as_deref()
                .is_none_or(|name| query.has_variable(name))),
            ExpressionOutcome::Value(false) => Ok(false),
            ExpressionOutcome::PropertyNotFound(property) => {
                tracing::debug!(
                    parent: &self.span,
                    process_definition_id = %process_definition.id,
                    %expression,
                    %property,
                    "condition references unknown property, treating as not satisfied"
                );
                Ok(false)
            }
        }
    }
}

impl std::fmt::Debug for ConditionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionEvaluator").finish_non_exhaustive()
    }
}
