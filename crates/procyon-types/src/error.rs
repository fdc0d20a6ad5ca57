use thiserror::Error;

/// Errors raised by the subscription store and definition cache collaborators.
///
/// Trait definitions in `procyon-core` return this type so that every backend
/// (in-memory, SQL, remote cache) reports failures the same way.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),
}
