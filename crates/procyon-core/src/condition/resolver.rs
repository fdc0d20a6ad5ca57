//! Candidate lookup for conditional start evaluation.
//!
//! Two resolvers, one per branch of `TriggerMatcher`:
//! - `SubscriptionResolver` -- no target definition; reads stored
//!   conditional start subscriptions, optionally for one tenant
//! - `DefinitionActivityResolver` -- a target definition is known; reads its
//!   conditional start declarations from the definition cache

use std::sync::Arc;

use procyon_types::condition::ConditionQuery;
use procyon_types::definition::{EventDeclaration, ProcessDefinition};
use procyon_types::error::RepositoryError;
use procyon_types::event::EventSubscription;

use super::error::ConditionError;
use crate::repository::{EventSubscriptionStore, ProcessDefinitionCache};

// ---------------------------------------------------------------------------
// SubscriptionResolver
// ---------------------------------------------------------------------------

/// Finds conditional start subscriptions for queries without a target definition.
#[derive(Clone)]
pub struct SubscriptionResolver {
    store: Arc<dyn EventSubscriptionStore>,
}

impl SubscriptionResolver {
    pub fn new(store: Arc<dyn EventSubscriptionStore>) -> Self {
        Self { store }
    }

    /// Candidate subscriptions in store order.
    ///
    /// With an explicit tenant filter an empty result is an error
    /// ([`ConditionError::NoSubscriptions`]). Without one, an empty result is
    /// returned as is.
    pub fn find_candidates(
        &self,
        query: &ConditionQuery,
    ) -> Result<Vec<EventSubscription>, ConditionError> {
        if !query.is_tenant_filter_set() {
            return Ok(self.store.find_conditional_start()?);
        }

        let tenant_id = query.tenant_id_filter();
        let subscriptions = self.store.find_conditional_start_by_tenant(tenant_id)?;
        if subscriptions.is_empty() {
            return Err(ConditionError::NoSubscriptions {
                tenant_id: tenant_id.map(str::to_string),
            });
        }
        Ok(subscriptions)
    }
}

// ---------------------------------------------------------------------------
// DefinitionActivityResolver
// ---------------------------------------------------------------------------

/// Loads definitions and enumerates their conditional start activities.
#[derive(Clone)]
pub struct DefinitionActivityResolver {
    cache: Arc<dyn ProcessDefinitionCache>,
}

impl DefinitionActivityResolver {
    pub fn new(cache: Arc<dyn ProcessDefinitionCache>) -> Self {
        Self { cache }
    }

    /// Look up a definition regardless of its suspension state.
    pub fn definition(&self, id: &str) -> Result<Option<Arc<ProcessDefinition>>, RepositoryError> {
        self.cache.find_by_id(id)
    }

    /// Look up a definition that may start new instances.
    ///
    /// Unknown and suspended definitions both yield `None`.
    pub fn load_active(&self, id: &str) -> Result<Option<Arc<ProcessDefinition>>, RepositoryError> {
        match self.cache.find_by_id(id)? {
            Some(definition) if definition.is_suspended() => {
                tracing::debug!(process_definition_id = id, "definition is suspended, no candidates");
                Ok(None)
            }
            Some(definition) => Ok(Some(definition)),
            None => {
                tracing::debug!(process_definition_id = id, "definition not found, no candidates");
                Ok(None)
            }
        }
    }

    /// Conditional start declarations of `definition`, in declaration order.
    pub fn find_start_activities(definition: &ProcessDefinition) -> Vec<&EventDeclaration> {
        definition.conditional_start_events().collect()
    }
}
