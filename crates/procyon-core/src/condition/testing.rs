//! In-crate fakes for the collaborator traits.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use procyon_types::definition::{
    ActivityRef, ConditionalEventDefinition, EventDeclaration, ProcessDefinition, SuspensionState,
};
use procyon_types::error::RepositoryError;
use procyon_types::event::{EventSubscription, EventType};

use crate::repository::{EventSubscriptionStore, ProcessDefinitionCache};

pub fn definition(key: &str, declarations: Vec<EventDeclaration>) -> ProcessDefinition {
    ProcessDefinition {
        id: format!("{key}:1:test"),
        key: key.to_string(),
        version: 1,
        tenant_id: None,
        suspension_state: SuspensionState::Active,
        event_declarations: declarations,
    }
}

pub fn conditional_start(activity_id: &str, expression: &str) -> EventDeclaration {
    EventDeclaration::conditional_start(
        ActivityRef::new(activity_id),
        ConditionalEventDefinition::new(expression),
    )
}

pub fn subscription(def: &ProcessDefinition, activity_id: &str) -> EventSubscription {
    EventSubscription {
        id: format!("{}#{activity_id}", def.id),
        event_type: EventType::Conditional,
        event_name: None,
        process_definition_id: def.id.clone(),
        activity_id: activity_id.to_string(),
        tenant_id: def.tenant_id.clone(),
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct FakeSubscriptions {
    pub subscriptions: Vec<EventSubscription>,
    pub fail: bool,
}

impl EventSubscriptionStore for FakeSubscriptions {
    fn find_conditional_start_by_tenant(
        &self,
        tenant_id: Option<&str>,
    ) -> Result<Vec<EventSubscription>, RepositoryError> {
        Ok(self
            .find_conditional_start()?
            .into_iter()
            .filter(|s| s.tenant_id.as_deref() == tenant_id)
            .collect())
    }

    fn find_conditional_start(&self) -> Result<Vec<EventSubscription>, RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Unavailable("fake store down".to_string()));
        }
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| s.is_conditional())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeDefinitions {
    pub definitions: HashMap<String, Arc<ProcessDefinition>>,
}

impl FakeDefinitions {
    pub fn with(definitions: impl IntoIterator<Item = ProcessDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|d| (d.id.clone(), Arc::new(d)))
                .collect(),
        }
    }
}

impl ProcessDefinitionCache for FakeDefinitions {
    fn find_by_id(&self, id: &str) -> Result<Option<Arc<ProcessDefinition>>, RepositoryError> {
        Ok(self.definitions.get(id).cloned())
    }
}
