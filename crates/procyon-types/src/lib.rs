//! Shared domain types for Procyon.
//!
//! This crate contains the data the condition subsystem reads and produces:
//! process definitions with their event declarations, event subscriptions,
//! condition queries, match results, engine configuration, and the
//! repository error type shared by every collaborator.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod condition;
pub mod config;
pub mod definition;
pub mod error;
pub mod event;
