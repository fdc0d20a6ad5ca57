//! Expression backend for conditional event conditions.
//!
//! Conditions are JEXL expressions evaluated with `jexl_eval`. Engine-style
//! `${...}` / `#{...}` delimiters are accepted and stripped. Variables are
//! bound at the root of the evaluation context, so `${amount > 100}` reads
//! the `amount` variable of the query.
//!
//! Evaluation is lazy: `||`, `&&` and `?:` only evaluate the operands they
//! need. A root identifier reached during evaluation that the scope does not
//! hold is reported as [`ExpressionOutcome::PropertyNotFound`], an `Ok` value.
//! Everything else that goes wrong is an [`ExpressionError`].

use std::collections::HashMap;

use jexl_eval::error::EvaluationError;
use procyon_types::definition::ProcessDefinition;
use serde_json::{json, Value};

/// Root name under which the owning definition is exposed to expressions.
pub const PROCESS_DEFINITION_VARIABLE: &str = "processDefinition";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Fatal expression failures. Missing variables are not errors.
#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    #[error("evaluation of '{expression}' failed: {message}")]
    EvalFailed { expression: String, message: String },

    #[error("condition '{expression}' did not evaluate to a boolean: got {result}")]
    NotBoolean { expression: String, result: Value },
}

// ---------------------------------------------------------------------------
// Expression
// ---------------------------------------------------------------------------

/// A condition expression with its delimiters removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    source: String,
}

impl Expression {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let source = strip_delimiters(trimmed).unwrap_or(trimmed);
        Self {
            source: source.trim().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Whether `text` is written as a `${...}` or `#{...}` expression.
pub fn is_expression(text: &str) -> bool {
    strip_delimiters(text.trim()).is_some()
}

fn strip_delimiters(text: &str) -> Option<&str> {
    text.strip_prefix("${")
        .or_else(|| text.strip_prefix("#{"))
        .and_then(|rest| rest.strip_suffix('}'))
}

// ---------------------------------------------------------------------------
// VariableScope
// ---------------------------------------------------------------------------

/// Transient binding context for one condition evaluation.
///
/// Holds nothing but the query variables and the definition that owns the
/// conditional event. It is never persisted and carries no execution state.
#[derive(Debug, Clone, Copy)]
pub struct VariableScope<'a> {
    variables: &'a HashMap<String, Value>,
    process_definition: &'a ProcessDefinition,
}

impl<'a> VariableScope<'a> {
    pub fn new(variables: &'a HashMap<String, Value>, process_definition: &'a ProcessDefinition) -> Self {
        Self {
            variables,
            process_definition,
        }
    }

    pub fn variables(&self) -> &'a HashMap<String, Value> {
        self.variables
    }

    pub fn process_definition(&self) -> &'a ProcessDefinition {
        self.process_definition
    }

    /// Whether `name` resolves to a value in this scope.
    pub fn resolves(&self, name: &str) -> bool {
        self.variables.contains_key(name) || name == PROCESS_DEFINITION_VARIABLE
    }

    /// Build the JSON object expressions evaluate against.
    ///
    /// Shape: every variable at the root, plus
    /// `processDefinition: { id, key, version, tenantId }` unless a variable
    /// of that name shadows it.
    pub fn to_expression_context(&self) -> Value {
        let mut context: serde_json::Map<String, Value> = self
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        context
            .entry(PROCESS_DEFINITION_VARIABLE)
            .or_insert_with(|| {
                json!({
                    "id": self.process_definition.id,
                    "key": self.process_definition.key,
                    "version": self.process_definition.version,
                    "tenantId": self.process_definition.tenant_id,
                })
            });

        Value::Object(context)
    }
}

// ---------------------------------------------------------------------------
// ExpressionBackend
// ---------------------------------------------------------------------------

/// Non-fatal result of evaluating a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionOutcome {
    /// The condition evaluated to this boolean.
    Value(bool),
    /// The condition references a variable the scope does not hold.
    PropertyNotFound(String),
}

/// Evaluates condition expressions against a variable scope.
///
/// Must be pure: no I/O and no shared mutable state.
pub trait ExpressionBackend: Send + Sync {
    fn evaluate(
        &self,
        expression: &Expression,
        scope: &VariableScope<'_>,
    ) -> Result<ExpressionOutcome, ExpressionError>;
}

// ---------------------------------------------------------------------------
// JexlBackend
// ---------------------------------------------------------------------------

/// JEXL backend with the standard string transforms registered.
///
/// A fresh `jexl_eval::Evaluator` is built per call so the backend itself is
/// stateless and trivially shareable across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JexlBackend;

impl JexlBackend {
    pub fn new() -> Self {
        Self
    }

    fn evaluator() -> jexl_eval::Evaluator<'static> {
        jexl_eval::Evaluator::new()
            .with_transform("lower", |args: &[Value]| {
                Ok(json!(str_arg(args, 0).to_lowercase()))
            })
            .with_transform("upper", |args: &[Value]| {
                Ok(json!(str_arg(args, 0).to_uppercase()))
            })
            .with_transform("trim", |args: &[Value]| Ok(json!(str_arg(args, 0).trim())))
            .with_transform("contains", |args: &[Value]| {
                Ok(json!(str_arg(args, 0).contains(str_arg(args, 1))))
            })
            .with_transform("startsWith", |args: &[Value]| {
                Ok(json!(str_arg(args, 0).starts_with(str_arg(args, 1))))
            })
            .with_transform("endsWith", |args: &[Value]| {
                Ok(json!(str_arg(args, 0).ends_with(str_arg(args, 1))))
            })
            .with_transform("length", |args: &[Value]| {
                let len = match args.first() {
                    Some(Value::String(s)) => s.chars().count(),
                    Some(Value::Array(a)) => a.len(),
                    Some(Value::Object(o)) => o.len(),
                    _ => 0,
                };
                Ok(json!(len as f64))
            })
    }
}

impl ExpressionBackend for JexlBackend {
    fn evaluate(
        &self,
        expression: &Expression,
        scope: &VariableScope<'_>,
    ) -> Result<ExpressionOutcome, ExpressionError> {
        let context = scope.to_expression_context();
        match Self::evaluator().eval_in_context(expression.as_str(), &context) {
            Ok(Value::Bool(b)) => Ok(ExpressionOutcome::Value(b)),
            Ok(other) => Err(ExpressionError::NotBoolean {
                expression: expression.to_string(),
                result: other,
            }),
            Err(EvaluationError::UndefinedIdentifier(name)) => {
                Ok(ExpressionOutcome::PropertyNotFound(name))
            }
            Err(e) => Err(ExpressionError::EvalFailed {
                expression: expression.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

fn str_arg(args: &[Value], index: usize) -> &str {
    args.get(index).and_then(|v| v.as_str()).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
