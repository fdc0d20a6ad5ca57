//! In-memory collaborators.
//!
//! - `subscription` -- [`InMemoryEventSubscriptionStore`], insertion ordered
//! - `definition` -- [`InMemoryDefinitionCache`], keyed by definition id
//! - `deployment` -- [`Deployer`], versions definitions and keeps their
//!   conditional start subscriptions in step

pub mod definition;
pub mod deployment;
pub mod subscription;

pub use definition::InMemoryDefinitionCache;
pub use deployment::{Deployer, ProcessModel};
pub use subscription::InMemoryEventSubscriptionStore;

use procyon_types::error::RepositoryError;

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("in-memory lock poisoned".to_string())
}
