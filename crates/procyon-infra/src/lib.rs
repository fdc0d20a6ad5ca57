//! Infrastructure layer for Procyon.
//!
//! Contains implementations of the collaborator traits defined in
//! `procyon-core`: an in-memory subscription store, an in-memory definition
//! cache, a deployer that keeps both in step, and the TOML configuration
//! loader.

pub mod config;
pub mod memory;
