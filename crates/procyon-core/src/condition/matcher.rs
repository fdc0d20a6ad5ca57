//! Entry point for evaluating conditional start events.
//!
//! `TriggerMatcher` takes a `ConditionQuery` and returns every conditional
//! start event whose condition is satisfied by the query's variables.
//!
//! Two branches:
//! - no target definition: candidates come from stored conditional start
//!   subscriptions (optionally for one tenant)
//! - target definition: candidates are that definition's conditional start
//!   declarations; an unknown or suspended definition yields no matches
//!
//! Suspended definitions never produce matches. Results keep the order in
//! which the resolver returned candidates.

use std::sync::Arc;

use procyon_types::condition::{ConditionQuery, MatchResult};
use procyon_types::definition::{EventDeclaration, ProcessDefinition};

use super::error::ConditionError;
use super::evaluator::ConditionEvaluator;
use super::expression::ExpressionBackend;
use super::resolver::{DefinitionActivityResolver, SubscriptionResolver};
use crate::repository::{EventSubscriptionStore, ProcessDefinitionCache};

/// Evaluates conditional start events against injected collaborators.
#[derive(Clone)]
pub struct TriggerMatcher {
    subscriptions: SubscriptionResolver,
    definitions: DefinitionActivityResolver,
    evaluator: ConditionEvaluator,
}

impl TriggerMatcher {
    pub fn new(
        subscriptions: Arc<dyn EventSubscriptionStore>,
        definitions: Arc<dyn ProcessDefinitionCache>,
        backend: Arc<dyn ExpressionBackend>,
    ) -> Self {
        Self::with_evaluator(subscriptions, definitions, ConditionEvaluator::new(backend))
    }

    /// Build with a preconfigured evaluator (e.g. one carrying a custom span).
    pub fn with_evaluator(
        subscriptions: Arc<dyn EventSubscriptionStore>,
        definitions: Arc<dyn ProcessDefinitionCache>,
        evaluator: ConditionEvaluator,
    ) -> Self {
        Self {
            subscriptions: SubscriptionResolver::new(subscriptions),
            definitions: DefinitionActivityResolver::new(definitions),
            evaluator,
        }
    }

    /// Evaluate the conditional start events selected by `query`.
    ///
    /// # Errors
    ///
    /// - [`ConditionError::NoSubscriptions`] when an explicit tenant filter
    ///   matches no subscription
    /// - [`ConditionError::Evaluation`] when a condition fails for a reason
    ///   other than a missing variable
    /// - [`ConditionError::Repository`] when a collaborator fails
    pub fn evaluate_start_condition(
        &self,
        query: &ConditionQuery,
    ) -> Result<Vec<MatchResult>, ConditionError> {
        let results = match query.target_process_definition_id() {
            None => self.evaluate_by_subscriptions(query)?,
            Some(id) => self.evaluate_by_definition(query, id)?,
        };

        tracing::debug!(
            process_definition_id = query.target_process_definition_id(),
            matches = results.len(),
            "evaluated conditional start events"
        );
        Ok(results)
    }

    fn evaluate_by_subscriptions(
        &self,
        query: &ConditionQuery,
    ) -> Result<Vec<MatchResult>, ConditionError> {
        let mut results = Vec::new();

        for subscription in self.subscriptions.find_candidates(query)? {
            let Some(definition) = self
                .definitions
                .definition(&subscription.process_definition_id)?
            else {
                tracing::warn!(
                    subscription_id = %subscription.id,
                    process_definition_id = %subscription.process_definition_id,
                    "subscription references an unknown process definition, skipping"
                );
                continue;
            };

            if definition.is_suspended() {
                continue;
            }

            let Some(declaration) = definition.conditional_start_event(&subscription.activity_id)
            else {
                tracing::warn!(
                    subscription_id = %subscription.id,
                    activity_id = %subscription.activity_id,
                    "subscription activity has no conditional start declaration, skipping"
                );
                continue;
            };

            if self.matches(query, &definition, declaration)? {
                results.push(MatchResult::new(
                    Arc::clone(&definition),
                    declaration.activity.clone(),
                ));
            }
        }

        Ok(results)
    }

    fn evaluate_by_definition(
        &self,
        query: &ConditionQuery,
        process_definition_id: &str,
    ) -> Result<Vec<MatchResult>, ConditionError> {
        let Some(definition) = self.definitions.load_active(process_definition_id)? else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for declaration in DefinitionActivityResolver::find_start_activities(&definition) {
            if self.matches(query, &definition, declaration)? {
                results.push(MatchResult::new(
                    Arc::clone(&definition),
                    declaration.activity.clone(),
                ));
            }
        }
        Ok(results)
    }

    fn matches(
        &self,
        query: &ConditionQuery,
        definition: &ProcessDefinition,
        declaration: &EventDeclaration,
    ) -> Result<bool, ConditionError> {
        let Some(condition) = declaration.condition.as_ref() else {
            return Ok(false);
        };

        self.evaluator
            .evaluate(query, definition, condition)
            .map_err(|source| ConditionError::Evaluation {
                process_definition_id: definition.id.clone(),
                activity_id: declaration.activity.id.clone(),
                source,
            })
    }
}

impl std::fmt::Debug for TriggerMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerMatcher")
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::expression::JexlBackend;
    use crate::condition::testing::{
        conditional_start, definition, subscription, FakeDefinitions, FakeSubscriptions,
    };
    use procyon_types::definition::{ActivityRef, ConditionalEventDefinition, SuspensionState};
    use procyon_types::event::EventType;
    use serde_json::json;

    fn matcher(
        subscriptions: Vec<procyon_types::event::EventSubscription>,
        definitions: Vec<ProcessDefinition>,
    ) -> TriggerMatcher {
        TriggerMatcher::new(
            Arc::new(FakeSubscriptions {
                subscriptions,
                fail: false,
            }),
            Arc::new(FakeDefinitions::with(definitions)),
            Arc::new(JexlBackend::new()),
        )
    }

    fn activity_ids(results: &[MatchResult]) -> Vec<&str> {
        results.iter().map(|r| r.activity.id.as_str()).collect()
    }

    // -------------------------------------------------------------------
    // Branch A: by subscription
    // -------------------------------------------------------------------

    #[test]
    fn test_subscriptions_matching_conditions_in_store_order() {
        let a = definition("a", vec![conditional_start("startA", "${temp > 30}")]);
        let b = definition("b", vec![conditional_start("startB", "${temp < 0}")]);
        let c = definition("c", vec![conditional_start("startC", "${temp > 10}")]);
        let subs = vec![
            subscription(&c, "startC"),
            subscription(&a, "startA"),
            subscription(&b, "startB"),
        ];
        let m = matcher(subs, vec![a, b, c]);

        let results = m
            .evaluate_start_condition(&ConditionQuery::new().set_variable("temp", 35))
            .unwrap();
        assert_eq!(activity_ids(&results), vec!["startC", "startA"]);
        assert_eq!(results[0].process_definition.key, "c");
    }

    #[test]
    fn test_explicit_tenant_without_subscriptions_fails() {
        let a = definition("a", vec![conditional_start("start", "${true}")]);
        let m = matcher(vec![subscription(&a, "start")], vec![a]);

        let err = m
            .evaluate_start_condition(&ConditionQuery::new().tenant_id("acme"))
            .unwrap_err();
        assert!(matches!(err, ConditionError::NoSubscriptions { .. }));
    }

    #[test]
    fn test_without_tenant_and_no_shared_subscriptions_fails() {
        let mut a = definition("a", vec![conditional_start("start", "${true}")]);
        a.tenant_id = Some("acme".to_string());
        let m = matcher(vec![subscription(&a, "start")], vec![a]);

        let err = m
            .evaluate_start_condition(&ConditionQuery::new().without_tenant_id())
            .unwrap_err();
        assert!(matches!(err, ConditionError::NoSubscriptions { tenant_id: None }));
    }

    #[test]
    fn test_no_tenant_filter_and_no_subscriptions_is_empty() {
        let m = matcher(vec![], vec![]);
        let results = m.evaluate_start_condition(&ConditionQuery::new()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_suspended_definition_never_matches() {
        let mut a = definition("a", vec![conditional_start("start", "${true}")]);
        a.suspension_state = SuspensionState::Suspended;
        let b = definition("b", vec![conditional_start("start", "${true}")]);
        let m = matcher(vec![subscription(&a, "start"), subscription(&b, "start")], vec![a, b]);

        let results = m.evaluate_start_condition(&ConditionQuery::new()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].process_definition.key, "b");
    }

    #[test]
    fn test_suspended_tenant_definition_counts_as_subscription() {
        // The tenant has subscriptions, so this is not a NoSubscriptions error,
        // but the only definition is suspended.
        let mut a = definition("a", vec![conditional_start("start", "${true}")]);
        a.tenant_id = Some("acme".to_string());
        a.suspension_state = SuspensionState::Suspended;
        let m = matcher(vec![subscription(&a, "start")], vec![a]);

        let results = m
            .evaluate_start_condition(&ConditionQuery::new().tenant_id("acme"))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_dangling_subscriptions_are_skipped() {
        let a = definition("a", vec![conditional_start("start", "${true}")]);
        let ghost = definition("ghost", vec![conditional_start("start", "${true}")]);
        let subs = vec![
            subscription(&ghost, "start"),
            subscription(&a, "otherActivity"),
            subscription(&a, "start"),
        ];
        let m = matcher(subs, vec![a]);

        let results = m.evaluate_start_condition(&ConditionQuery::new()).unwrap();
        assert_eq!(activity_ids(&results), vec!["start"]);
    }

    #[test]
    fn test_variable_name_binding_via_subscription() {
        let def = definition(
            "a",
            vec![EventDeclaration::conditional_start(
                ActivityRef::new("start"),
                ConditionalEventDefinition::new("${true}").with_variable_name("v"),
            )],
        );
        let m = matcher(vec![subscription(&def, "start")], vec![def]);

        assert!(m.evaluate_start_condition(&ConditionQuery::new()).unwrap().is_empty());
        let results = m
            .evaluate_start_condition(&ConditionQuery::new().set_variable("v", 1))
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_missing_variable_does_not_abort_other_candidates() {
        let a = definition("a", vec![conditional_start("start", "${x > 1}")]);
        let b = definition("b", vec![conditional_start("start", "${y > 1}")]);
        let m = matcher(vec![subscription(&a, "start"), subscription(&b, "start")], vec![a, b]);

        let results = m
            .evaluate_start_condition(&ConditionQuery::new().set_variable("y", json!(5)))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].process_definition.key, "b");
    }

    #[test]
    fn test_missing_variable_after_or_does_not_abort_other_candidates() {
        let a = definition("a", vec![conditional_start("start", "${y == 2 || x > 1}")]);
        let b = definition("b", vec![conditional_start("start", "${y > 1}")]);
        let m = matcher(vec![subscription(&a, "start"), subscription(&b, "start")], vec![a, b]);

        let results = m
            .evaluate_start_condition(&ConditionQuery::new().set_variable("y", json!(5)))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].process_definition.key, "b");
    }

    #[test]
    fn test_evaluation_fault_aborts_call() {
        let a = definition("a", vec![conditional_start("start", "${x >}")]);
        let m = matcher(vec![subscription(&a, "start")], vec![a.clone()]);

        let err = m
            .evaluate_start_condition(&ConditionQuery::new().set_variable("x", 1))
            .unwrap_err();
        match err {
            ConditionError::Evaluation {
                process_definition_id,
                activity_id,
                ..
            } => {
                assert_eq!(process_definition_id, a.id);
                assert_eq!(activity_id, "start");
            }
            other => panic!("expected Evaluation, got {other:?}"),
        }
    }

    #[test]
    fn test_non_conditional_subscriptions_are_ignored() {
        let a = definition("a", vec![conditional_start("start", "${true}")]);
        let mut message = subscription(&a, "start");
        message.event_type = EventType::Message;
        let m = matcher(vec![message], vec![a]);

        assert!(m.evaluate_start_condition(&ConditionQuery::new()).unwrap().is_empty());
    }

    // -------------------------------------------------------------------
    // Branch B: by process definition id
    // -------------------------------------------------------------------

    #[test]
    fn test_definition_branch_returns_only_true_activity() {
        let def = definition(
            "order",
            vec![
                conditional_start("bigOrder", "${total >= 1000}"),
                conditional_start("smallOrder", "${total < 1000}"),
            ],
        );
        let m = matcher(vec![], vec![def.clone()]);

        let results = m
            .evaluate_start_condition(
                &ConditionQuery::new()
                    .process_definition_id(&def.id)
                    .set_variable("total", 1500),
            )
            .unwrap();
        assert_eq!(activity_ids(&results), vec!["bigOrder"]);
        assert_eq!(results[0].process_definition_id(), def.id);
    }

    #[test]
    fn test_unknown_definition_is_empty_not_error() {
        let m = matcher(vec![], vec![]);
        let results = m
            .evaluate_start_condition(&ConditionQuery::new().process_definition_id("missing:1:x"))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_suspended_target_definition_is_empty() {
        let mut def = definition("order", vec![conditional_start("start", "${true}")]);
        def.suspension_state = SuspensionState::Suspended;
        let m = matcher(vec![], vec![def.clone()]);

        let results = m
            .evaluate_start_condition(&ConditionQuery::new().process_definition_id(&def.id))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_definition_branch_ignores_tenant_filter_and_subscriptions() {
        let def = definition("order", vec![conditional_start("start", "${true}")]);
        let m = matcher(vec![], vec![def.clone()]);

        let results = m
            .evaluate_start_condition(
                &ConditionQuery::new()
                    .process_definition_id(&def.id)
                    .tenant_id("acme"),
            )
            .unwrap();
        assert_eq!(results.len(), 1);
    }
}
