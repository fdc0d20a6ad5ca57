//! Business logic and collaborator trait definitions for Procyon.
//!
//! This crate defines the "ports" (store and cache traits) that the
//! infrastructure layer implements, the JEXL expression backend, conditional
//! start evaluation, and the failed-job retry policy model. It depends only
//! on `procyon-types` -- never on `procyon-infra` or any storage crate.

pub mod condition;
pub mod job;
pub mod repository;
