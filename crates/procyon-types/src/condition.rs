//! Condition evaluation request and result types.
//!
//! `ConditionQuery` describes a single "evaluate conditional start events"
//! request. `MatchResult` is one satisfied start event.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::definition::{ActivityRef, ProcessDefinition};

// ---------------------------------------------------------------------------
// TenantFilter
// ---------------------------------------------------------------------------

/// Tenant restriction of a condition query.
///
/// `Any` and `WithoutTenant` are different queries: the first applies no
/// tenant filter at all, the second asks for definitions that belong to no
/// tenant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TenantFilter {
    #[default]
    Any,
    Tenant(String),
    WithoutTenant,
}

// ---------------------------------------------------------------------------
// ConditionQuery
// ---------------------------------------------------------------------------

/// Input of a conditional start evaluation.
///
/// Built with consuming setters:
///
/// ```
/// use procyon_types::condition::ConditionQuery;
///
/// let query = ConditionQuery::new()
///     .tenant_id("acme")
///     .set_variable("amount", 250);
/// assert!(query.is_tenant_filter_set());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConditionQuery {
    process_definition_id: Option<String>,
    tenant: TenantFilter,
    variables: HashMap<String, Value>,
}

impl ConditionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate only the conditional start events of this definition.
    pub fn process_definition_id(mut self, id: impl Into<String>) -> Self {
        self.process_definition_id = Some(id.into());
        self
    }

    /// Restrict evaluation to subscriptions of `tenant_id`.
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant = TenantFilter::Tenant(tenant_id.into());
        self
    }

    /// Restrict evaluation to subscriptions without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.tenant = TenantFilter::WithoutTenant;
        self
    }

    pub fn set_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn set_variables<I, K>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn target_process_definition_id(&self) -> Option<&str> {
        self.process_definition_id.as_deref()
    }

    pub fn tenant_filter(&self) -> &TenantFilter {
        &self.tenant
    }

    /// Whether a tenant filter was requested (including "without tenant").
    pub fn is_tenant_filter_set(&self) -> bool {
        self.tenant != TenantFilter::Any
    }

    /// Tenant id of the filter; `None` both for no filter and for "without tenant".
    pub fn tenant_id_filter(&self) -> Option<&str> {
        match &self.tenant {
            TenantFilter::Tenant(id) => Some(id),
            TenantFilter::Any | TenantFilter::WithoutTenant => None,
        }
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }
}

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

/// A conditional start event whose condition was satisfied.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub process_definition: Arc<ProcessDefinition>,
    pub activity: ActivityRef,
}

impl MatchResult {
    pub fn new(process_definition: Arc<ProcessDefinition>, activity: ActivityRef) -> Self {
        Self {
            process_definition,
            activity,
        }
    }

    pub fn process_definition_id(&self) -> &str {
        &self.process_definition.id
    }
}
