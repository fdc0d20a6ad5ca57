//! Deployed process definition types.
//!
//! These are the parts of a parsed BPMN definition that trigger evaluation
//! reads: identity, tenant, suspension state, and the event declarations
//! scoped to the definition itself (i.e. its start events).

use serde::{Deserialize, Serialize};

use crate::event::EventType;

// ---------------------------------------------------------------------------
// ProcessDefinition
// ---------------------------------------------------------------------------

/// A deployed, versioned process definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    /// Unique id (`key:version:uid`).
    pub id: String,
    /// Business key shared by all versions.
    pub key: String,
    /// Version number, 1-based and increasing per key and tenant.
    pub version: u32,
    /// Owning tenant; `None` for the shared tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Whether new instances may be started.
    #[serde(default)]
    pub suspension_state: SuspensionState,
    /// Event declarations scoped to the definition.
    #[serde(default)]
    pub event_declarations: Vec<EventDeclaration>,
}

impl ProcessDefinition {
    pub fn is_suspended(&self) -> bool {
        self.suspension_state == SuspensionState::Suspended
    }

    /// Declarations that are conditional start events with a bound condition.
    pub fn conditional_start_events(&self) -> impl Iterator<Item = &EventDeclaration> {
        self.event_declarations
            .iter()
            .filter(|d| d.is_conditional_start())
    }

    /// Find the conditional start declaration bound to `activity_id`.
    pub fn conditional_start_event(&self, activity_id: &str) -> Option<&EventDeclaration> {
        self.conditional_start_events()
            .find(|d| d.activity.id == activity_id)
    }
}

/// Suspension state of a process definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionState {
    #[default]
    Active,
    Suspended,
}

// ---------------------------------------------------------------------------
// Activities and event declarations
// ---------------------------------------------------------------------------

/// Reference to an activity inside a process definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityRef {
    /// BPMN element id.
    pub id: String,
    /// Display name, if the model gives one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ActivityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// An event declaration produced by the BPMN parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDeclaration {
    /// The kind of event declared.
    pub event_type: EventType,
    /// Whether the declaration belongs to a start event.
    #[serde(default)]
    pub is_start_event: bool,
    /// Message/signal name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    /// The activity this declaration starts or interrupts.
    pub activity: ActivityRef,
    /// Condition details; present for conditional events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionalEventDefinition>,
}

impl EventDeclaration {
    /// Build a conditional start event declaration.
    pub fn conditional_start(activity: ActivityRef, condition: ConditionalEventDefinition) -> Self {
        Self {
            event_type: EventType::Conditional,
            is_start_event: true,
            event_name: None,
            activity,
            condition: Some(condition),
        }
    }

    pub fn is_conditional_start(&self) -> bool {
        self.event_type == EventType::Conditional && self.is_start_event && self.condition.is_some()
    }
}

/// Condition bound to a conditional event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalEventDefinition {
    /// Condition expression (`${...}` delimiters are optional).
    pub expression: String,
    /// Variable that must be present for the condition to fire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    /// Variable lifecycle events the condition reacts to. Unused for start events.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable_events: Vec<VariableEvent>,
}

impl ConditionalEventDefinition {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            variable_name: None,
            variable_events: Vec::new(),
        }
    }

    pub fn with_variable_name(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(name.into());
        self
    }
}

/// Variable lifecycle event a conditional event can be limited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableEvent {
    Create,
    Update,
    Delete,
}
