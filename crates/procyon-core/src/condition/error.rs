use procyon_types::error::RepositoryError;

use super::expression::ExpressionError;

/// Failures that abort a conditional start evaluation.
///
/// Missing variables, suspended definitions, and unknown definition ids are
/// not represented here: they only shrink the match list.
#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    /// An explicit tenant filter matched no conditional start subscription.
    #[error("no subscriptions were found during evaluation of the conditional start events (tenant: {})", .tenant_id.as_deref().unwrap_or("<none>"))]
    NoSubscriptions { tenant_id: Option<String> },

    /// A condition could not be evaluated.
    #[error("condition of activity '{activity_id}' in '{process_definition_id}' failed: {source}")]
    Evaluation {
        process_definition_id: String,
        activity_id: String,
        #[source]
        source: ExpressionError,
    },

    /// The subscription store or definition cache failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
