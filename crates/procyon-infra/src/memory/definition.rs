//! In-memory process definition cache backed by `DashMap`.
//!
//! Definitions are stored as `Arc<ProcessDefinition>` and cloned out on read
//! so no `DashMap` guard outlives a call. Suspension changes replace the
//! stored `Arc`; callers holding an earlier snapshot keep seeing the old state.

use std::sync::Arc;

use dashmap::DashMap;
use procyon_core::repository::ProcessDefinitionCache;
use procyon_types::definition::{ProcessDefinition, SuspensionState};
use procyon_types::error::RepositoryError;

#[derive(Debug, Default)]
pub struct InMemoryDefinitionCache {
    definitions: DashMap<String, Arc<ProcessDefinition>>,
}

impl InMemoryDefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a definition, replacing any entry with the same id.
    pub fn insert(&self, definition: ProcessDefinition) -> Arc<ProcessDefinition> {
        let definition = Arc::new(definition);
        self.definitions
            .insert(definition.id.clone(), Arc::clone(&definition));
        definition
    }

    /// Drop a definition. Returns it if it was cached.
    pub fn remove(&self, id: &str) -> Option<Arc<ProcessDefinition>> {
        self.definitions.remove(id).map(|(_, definition)| definition)
    }

    /// All versions of `key` within `tenant_id`, oldest first.
    pub fn list_by_key(&self, key: &str, tenant_id: Option<&str>) -> Vec<Arc<ProcessDefinition>> {
        let mut found: Vec<Arc<ProcessDefinition>> = self
            .definitions
            .iter()
            .filter(|entry| entry.key == key && entry.tenant_id.as_deref() == tenant_id)
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        found.sort_by_key(|d| d.version);
        found
    }

    /// Highest deployed version of `key` within `tenant_id`.
    pub fn latest_version(&self, key: &str, tenant_id: Option<&str>) -> Option<Arc<ProcessDefinition>> {
        self.list_by_key(key, tenant_id).pop()
    }

    /// Stop the definition from starting new instances.
    pub fn suspend(&self, id: &str) -> Result<(), RepositoryError> {
        self.set_suspension_state(id, SuspensionState::Suspended)
    }

    /// Allow the definition to start new instances again.
    pub fn activate(&self, id: &str) -> Result<(), RepositoryError> {
        self.set_suspension_state(id, SuspensionState::Active)
    }

    fn set_suspension_state(&self, id: &str, state: SuspensionState) -> Result<(), RepositoryError> {
        let mut entry = self
            .definitions
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("process definition '{id}'")))?;
        Arc::make_mut(entry.value_mut()).suspension_state = state;
        tracing::info!(process_definition_id = id, ?state, "suspension state changed");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl ProcessDefinitionCache for InMemoryDefinitionCache {
    fn find_by_id(&self, id: &str) -> Result<Option<Arc<ProcessDefinition>>, RepositoryError> {
        Ok(self.definitions.get(id).map(|entry| Arc::clone(entry.value())))
    }
}
