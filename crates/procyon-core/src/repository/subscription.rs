//! Event subscription store trait definition.

use procyon_types::error::RepositoryError;
use procyon_types::event::EventSubscription;

/// Read access to stored conditional start event subscriptions.
///
/// Implementations may be shared by many concurrent callers and must give
/// thread-safe reads. Returned sequences keep the store's natural order;
/// callers rely on that order being stable within one call.
pub trait EventSubscriptionStore: Send + Sync {
    /// Conditional start subscriptions of one tenant.
    ///
    /// `None` selects subscriptions that belong to no tenant.
    fn find_conditional_start_by_tenant(
        &self,
        tenant_id: Option<&str>,
    ) -> Result<Vec<EventSubscription>, RepositoryError>;

    /// All conditional start subscriptions, regardless of tenant.
    fn find_conditional_start(&self) -> Result<Vec<EventSubscription>, RepositoryError>;
}
