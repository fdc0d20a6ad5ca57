//! Event subscription types.
//!
//! An `EventSubscription` is the persisted record that lets the engine find a
//! start event without loading every deployed definition. Conditional start
//! events get one subscription per (definition, activity) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of event a declaration or subscription listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Message,
    Signal,
    Compensate,
    Conditional,
}

impl EventType {
    /// Stable lowercase name, as stored by persistence backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Message => "message",
            EventType::Signal => "signal",
            EventType::Compensate => "compensate",
            EventType::Conditional => "conditional",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored event subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSubscription {
    /// Unique subscription identifier.
    pub id: String,
    /// The kind of event this subscription waits for.
    pub event_type: EventType,
    /// Message/signal name. Conditional subscriptions usually have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    /// Process definition that owns the start event.
    pub process_definition_id: String,
    /// Activity (start event) the subscription belongs to.
    pub activity_id: String,
    /// Tenant of the owning definition; `None` for the shared tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
}

impl EventSubscription {
    pub fn is_conditional(&self) -> bool {
        self.event_type == EventType::Conditional
    }
}
