//! Deployment of process models into the in-memory collaborators.
//!
//! Deploying a model creates the next version of its key within its tenant.
//! The previous version's conditional start subscriptions are replaced by one
//! subscription per conditional start declaration of the new version, so only
//! the latest version of a key is ever started by a conditional trigger.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use procyon_types::definition::{EventDeclaration, ProcessDefinition, SuspensionState};
use procyon_types::error::RepositoryError;
use procyon_types::event::{EventSubscription, EventType};
use uuid::Uuid;

use super::{InMemoryDefinitionCache, InMemoryEventSubscriptionStore, poisoned};

/// A parsed process model ready to be deployed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessModel {
    pub key: String,
    pub tenant_id: Option<String>,
    pub event_declarations: Vec<EventDeclaration>,
}

impl ProcessModel {
    pub fn new(key: impl Into<String>, event_declarations: Vec<EventDeclaration>) -> Self {
        Self {
            key: key.into(),
            tenant_id: None,
            event_declarations,
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

/// Versions process models and keeps subscriptions in step with them.
#[derive(Debug)]
pub struct Deployer {
    definitions: Arc<InMemoryDefinitionCache>,
    subscriptions: Arc<InMemoryEventSubscriptionStore>,
    // Serializes version assignment.
    deploy_lock: Mutex<()>,
}

impl Deployer {
    pub fn new(
        definitions: Arc<InMemoryDefinitionCache>,
        subscriptions: Arc<InMemoryEventSubscriptionStore>,
    ) -> Self {
        Self {
            definitions,
            subscriptions,
            deploy_lock: Mutex::new(()),
        }
    }

    /// Deploy `model` as the next version of its key.
    ///
    /// The new definition gets `version = latest + 1` (1 for a new key) and the
    /// id `key:version:<uuid v7>`.
    pub fn deploy(&self, model: ProcessModel) -> Result<Arc<ProcessDefinition>, RepositoryError> {
        if model.key.trim().is_empty() {
            return Err(RepositoryError::Query(
                "process model key must not be empty".to_string(),
            ));
        }

        let _guard = self.deploy_lock.lock().map_err(poisoned)?;

        let previous = self
            .definitions
            .latest_version(&model.key, model.tenant_id.as_deref());
        let version = previous.as_ref().map_or(1, |d| d.version + 1);

        let definition = ProcessDefinition {
            id: format!("{}:{version}:{}", model.key, Uuid::now_v7()),
            key: model.key,
            version,
            tenant_id: model.tenant_id,
            suspension_state: SuspensionState::Active,
            event_declarations: model.event_declarations,
        };
        let subscriptions: Vec<EventSubscription> = definition
            .conditional_start_events()
            .map(|declaration| EventSubscription {
                id: Uuid::now_v7().to_string(),
                event_type: EventType::Conditional,
                event_name: declaration.event_name.clone(),
                process_definition_id: definition.id.clone(),
                activity_id: declaration.activity.id.clone(),
                tenant_id: definition.tenant_id.clone(),
                created_at: Utc::now(),
            })
            .collect();
        let added = subscriptions.len();

        let definition = self.definitions.insert(definition);
        let removed = match self
            .subscriptions
            .replace_conditional(previous.as_ref().map(|d| d.id.as_str()), subscriptions)
        {
            Ok(removed) => removed,
            Err(err) => {
                self.definitions.remove(&definition.id);
                tracing::warn!(
                    process_definition_id = %definition.id,
                    error = %err,
                    "deployment rolled back"
                );
                return Err(err);
            }
        };

        tracing::info!(
            process_definition_id = %definition.id,
            key = %definition.key,
            version,
            subscriptions = added,
            replaced = removed,
            "deployed process definition"
        );
        Ok(definition)
    }
}
