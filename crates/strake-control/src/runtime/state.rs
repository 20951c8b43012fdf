//! The runtime context and its guarded state.

use crate::config::ConfigModel;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use strake_engine::Engine;
use tokio::sync::Mutex;

/// Startup options carried over from the command line.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Path of the persisted configuration file. May be empty, in which
    /// case `save` is rejected.
    pub config_path: PathBuf,
    /// Skip the configured file on cold start and fall back to the default
    /// path.
    pub reset: bool,
    /// Log the decoded configuration on cold start.
    pub print: bool,
}

pub(crate) struct RuntimeState {
    pub(crate) model: Option<ConfigModel>,
    pub(crate) engine: Option<Engine>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) stopped_at: Option<DateTime<Utc>>,
    pub(crate) last_error: Option<String>,
}

/// The control-plane context injected into every request handler.
///
/// All operations run under one critical section per runtime: the engine's
/// feature managers are not safe for concurrent structural mutation, and
/// the engine-then-model sequence must be atomic with respect to other
/// mutations.
pub struct Runtime {
    pub(crate) options: RuntimeOptions,
    pub(crate) state: Mutex<RuntimeState>,
}

impl Runtime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            options,
            state: Mutex::new(RuntimeState {
                model: None,
                engine: None,
                started_at: None,
                stopped_at: None,
                last_error: None,
            }),
        }
    }

    /// Whether a live engine instance exists and is running.
    pub async fn is_running(&self) -> bool {
        let state = self.state.lock().await;
        state
            .engine
            .as_ref()
            .map(|engine| engine.is_running())
            .unwrap_or(false)
    }

    /// Clone of the current model, for reconciliation and inspection.
    pub async fn model_snapshot(&self) -> Option<ConfigModel> {
        self.state.lock().await.model.clone()
    }

    /// Timestamp of the last successful start, if any.
    pub async fn started_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.started_at
    }
}
