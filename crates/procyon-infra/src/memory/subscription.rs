//! In-memory event subscription store.

use std::sync::RwLock;

use procyon_core::repository::EventSubscriptionStore;
use procyon_types::error::RepositoryError;
use procyon_types::event::{EventSubscription, EventType};

use super::poisoned;

/// Event subscriptions held in insertion order.
///
/// Lookups return clones so no lock is held after a call returns.
#[derive(Debug, Default)]
pub struct InMemoryEventSubscriptionStore {
    subscriptions: RwLock<Vec<EventSubscription>>,
}

impl InMemoryEventSubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscription. Ids must be unique.
    pub fn insert(&self, subscription: EventSubscription) -> Result<(), RepositoryError> {
        let mut subscriptions = self.subscriptions.write().map_err(poisoned)?;
        if subscriptions.iter().any(|s| s.id == subscription.id) {
            return Err(RepositoryError::Conflict(format!(
                "event subscription '{}' already exists",
                subscription.id
            )));
        }
        subscriptions.push(subscription);
        Ok(())
    }

    /// Add `added` and drop the conditional subscriptions of `replaced`.
    ///
    /// Applied under one write lock: either every new subscription is stored
    /// and the old ones removed, or the store is left unchanged. Returns the
    /// number of subscriptions removed.
    pub fn replace_conditional(
        &self,
        replaced: Option<&str>,
        added: Vec<EventSubscription>,
    ) -> Result<usize, RepositoryError> {
        let mut subscriptions = self.subscriptions.write().map_err(poisoned)?;
        for (i, new) in added.iter().enumerate() {
            if subscriptions.iter().chain(&added[..i]).any(|s| s.id == new.id) {
                return Err(RepositoryError::Conflict(format!(
                    "event subscription '{}' already exists",
                    new.id
                )));
            }
        }
        subscriptions.extend(added);

        let Some(replaced) = replaced else {
            return Ok(0);
        };
        let before = subscriptions.len();
        subscriptions.retain(|s| {
            s.process_definition_id != replaced || s.event_type != EventType::Conditional
        });
        Ok(before - subscriptions.len())
    }

    /// All subscriptions of every event type.
    pub fn all(&self) -> Result<Vec<EventSubscription>, RepositoryError> {
        Ok(self.subscriptions.read().map_err(poisoned)?.clone())
    }

    /// Number of stored subscriptions of every event type.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.subscriptions.read().map_err(poisoned)?.len())
    }
}

impl EventSubscriptionStore for InMemoryEventSubscriptionStore {
    fn find_conditional_start_by_tenant(
        &self,
        tenant_id: Option<&str>,
    ) -> Result<Vec<EventSubscription>, RepositoryError> {
        let subscriptions = self.subscriptions.read().map_err(poisoned)?;
        Ok(subscriptions
            .iter()
            .filter(|s| s.is_conditional() && s.tenant_id.as_deref() == tenant_id)
            .cloned()
            .collect())
    }

    fn find_conditional_start(&self) -> Result<Vec<EventSubscription>, RepositoryError> {
        let subscriptions = self.subscriptions.read().map_err(poisoned)?;
        Ok(subscriptions
            .iter()
            .filter(|s| s.is_conditional())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
impl InMemoryEventSubscriptionStore {
    /// Poison the lock by panicking while holding the write guard.
    pub(crate) fn poison_lock(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.subscriptions.write().unwrap();
            panic!("writer died holding the lock");
        }));
    }
}
