//! strake-control: runtime control plane for the strake relay engine.
//!
//! Keeps three things mutually consistent while entities are added and
//! removed at runtime: an in-memory authoritative configuration model, a
//! live engine instance, and an on-disk configuration file. The engine is
//! always mutated first; the model only mirrors changes the engine
//! accepted.

pub mod admin_api;
pub mod config;
pub mod error;
pub mod runtime;
