//! Collaborator trait definitions.
//!
//! The condition subsystem never owns persistence. It reads event
//! subscriptions and deployed definitions through these traits, which are
//! injected into `TriggerMatcher` at construction.

pub mod definition;
pub mod subscription;

pub use definition::ProcessDefinitionCache;
pub use subscription::EventSubscriptionStore;
