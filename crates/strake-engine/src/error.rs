//! Engine error type.

use thiserror::Error;

/// Errors surfaced by the engine and its feature managers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("tag '{0}' is already registered")]
    TagInUse(String),
    #[error("no handler registered for tag '{0}'")]
    NotFound(String),
    #[error("failed to bind port {port}: {reason}")]
    Bind { port: u16, reason: String },
    #[error("engine is not running")]
    NotRunning,
}
