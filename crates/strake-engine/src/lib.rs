//! strake-engine: an in-process TCP relay engine.
//!
//! The engine owns three runtime features: an inbound manager (listening
//! sockets), an outbound manager (connectors), and a router (ordered rules
//! binding inbound tags to outbound targets). All three accept
//! already-validated, engine-native configuration objects and may be mutated
//! while the engine is running. Stopping the engine releases its sockets but
//! keeps every registration, so a later start rebinds the same handlers.

pub mod config;

mod engine;
mod error;
mod inbound;
mod outbound;
mod relay;
mod router;

pub use config::{
    EngineConfig, InboundHandlerConfig, OutboundHandlerConfig, OutboundKind, RoutingRule,
};
pub use engine::Engine;
pub use error::EngineError;
pub use inbound::InboundManager;
pub use outbound::OutboundManager;
pub use router::Router;
