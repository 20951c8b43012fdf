//! Control-plane error taxonomy.
//!
//! Every operation returns a typed result; none of these conditions
//! terminate the process. `code()` is the stable identifier carried in the
//! response envelope.

use std::fmt;
use std::path::PathBuf;
use strake_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("tag '{0}' already exists")]
    DuplicateTag(String),
    #[error("tag '{0}' not found")]
    NotFound(String),
    #[error("tag mismatch: '{inbound}' (inbound) != '{outbound}' (outbound)")]
    TagMismatch { inbound: String, outbound: String },
    #[error("routing rule carries no tag")]
    MissingTag,
    #[error("invalid routing rule: {0}")]
    InvalidRoute(String),
    #[error("failed to build engine config: {0}")]
    Build(String),
    #[error("engine rejected the change: {0}")]
    EngineRejected(EngineError),
    #[error("failed to instantiate engine: {0}")]
    Instantiation(EngineError),
    #[error("failed to start engine: {0}")]
    Start(EngineError),
    #[error("failed to stop engine: {0}")]
    Stop(EngineError),
    #[error("failed to decode config file {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("failed to write config file {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },
    #[error("no config file path configured")]
    EmptyPath,
    #[error("configuration model is not initialized")]
    Uninitialized,
    #[error("bound pair operation failed: {0}")]
    Pair(PairFailure),
}

impl ControlError {
    /// Stable code carried in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateTag(_) => "duplicate_tag",
            Self::NotFound(_) => "not_found",
            Self::TagMismatch { .. } => "tag_mismatch",
            Self::MissingTag => "missing_tag",
            Self::InvalidRoute(_) => "invalid_route",
            Self::Build(_) => "build_failed",
            Self::EngineRejected(_) => "engine_rejected",
            Self::Instantiation(_) => "instantiation_failed",
            Self::Start(_) => "start_failed",
            Self::Stop(_) => "stop_failed",
            Self::Decode { .. } => "decode_failed",
            Self::Write { .. } => "write_failed",
            Self::EmptyPath => "empty_path",
            Self::Uninitialized => "uninitialized",
            Self::Pair(_) => "pair_failed",
        }
    }
}

/// Aggregate outcome of a composite bound-pair operation. Every leg is
/// attempted independently and reported here; partially applied state is
/// left in place for the caller to compensate with explicit removals.
#[derive(Debug)]
pub struct PairFailure {
    pub tag: String,
    pub outbound: Option<String>,
    pub inbound: Option<String>,
    pub route: Option<String>,
}

impl PairFailure {
    fn leg(err: &Option<String>) -> &str {
        err.as_deref().unwrap_or("ok")
    }
}

impl fmt::Display for PairFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' (tag) -> outbound: {}, inbound: {}, route: {}",
            self.tag,
            Self::leg(&self.outbound),
            Self::leg(&self.inbound),
            Self::leg(&self.route)
        )
    }
}
