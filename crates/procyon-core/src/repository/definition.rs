//! Deployed process definition cache trait definition.

use std::sync::Arc;

use procyon_types::definition::ProcessDefinition;
use procyon_types::error::RepositoryError;

/// Lookup of deployed process definitions by id.
///
/// Population and invalidation belong to the deployment layer; this trait is
/// read-only. Definitions are handed out as `Arc` so match results can keep a
/// reference without copying the declaration list.
pub trait ProcessDefinitionCache: Send + Sync {
    /// Get a deployed definition, or `None` if no definition has this id.
    fn find_by_id(&self, id: &str) -> Result<Option<Arc<ProcessDefinition>>, RepositoryError>;
}
