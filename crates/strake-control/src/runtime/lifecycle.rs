//! Engine lifecycle: cold/warm start, stop, restart, persistence.

use super::state::{Runtime, RuntimeState};
use crate::config::ConfigModel;
use crate::error::ControlError;
use chrono::Utc;
use std::path::PathBuf;
use strake_engine::Engine;
use tracing::{info, warn};

/// Result of a start request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The engine was already running; nothing was done.
    AlreadyRunning,
}

/// Result of a stop request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    /// No running engine; nothing was done.
    NotRunning,
}

impl Runtime {
    pub async fn start(&self) -> Result<StartOutcome, ControlError> {
        let mut state = self.state.lock().await;
        self.start_locked(&mut state).await
    }

    pub async fn stop(&self) -> Result<StopOutcome, ControlError> {
        let mut state = self.state.lock().await;
        self.stop_locked(&mut state).await
    }

    /// Stop, optionally discard the engine instance, start. `reload` forces
    /// the next start down the cold path, rebuilding from the persisted
    /// state. The whole sequence holds the critical section.
    pub async fn restart(&self, reload: bool) -> Result<StartOutcome, ControlError> {
        let mut state = self.state.lock().await;
        self.stop_locked(&mut state).await?;
        if reload {
            state.engine = None;
        }
        self.start_locked(&mut state).await
    }

    /// Serialize the model to the configured file path. Failures are
    /// reported to the caller, never fatal.
    pub async fn save(&self) -> Result<(), ControlError> {
        let state = self.state.lock().await;
        let model = state.model.as_ref().ok_or(ControlError::Uninitialized)?;
        if self.options.config_path.as_os_str().is_empty() {
            return Err(ControlError::EmptyPath);
        }
        model.save(&self.options.config_path)?;
        info!("config written to {}", self.options.config_path.display());
        Ok(())
    }

    pub(crate) async fn start_locked(
        &self,
        state: &mut RuntimeState,
    ) -> Result<StartOutcome, ControlError> {
        if state.engine.as_ref().is_some_and(|e| e.is_running()) {
            return Ok(StartOutcome::AlreadyRunning);
        }

        // Warm path: the instance survives a config-preserving stop.
        if let Some(engine) = state.engine.as_ref() {
            info!("restarting existing engine instance");
            return match engine.start().await {
                Ok(()) => {
                    state.started_at = Some(Utc::now());
                    state.last_error = None;
                    info!("engine restarted");
                    Ok(StartOutcome::Started)
                }
                Err(e) => {
                    state.last_error = Some(e.to_string());
                    Err(ControlError::Start(e))
                }
            };
        }

        // Cold path: load the persisted model and build a fresh instance.
        let model = match self.resolve_config_path() {
            Some(path) => {
                let model = ConfigModel::load(&path)?;
                if self.options.print {
                    if let Ok(text) = serde_json::to_string_pretty(&model) {
                        info!("config {}:\n{}", path.display(), text);
                    }
                }
                info!("loaded config from {}", path.display());
                model
            }
            None => {
                warn!("no config file found, starting from an empty model");
                ConfigModel::default()
            }
        };

        let engine_config = model.build()?;
        let engine = Engine::new(engine_config).map_err(ControlError::Instantiation)?;
        let started = engine.start().await;
        // The instance stays addressable even when start failed, so a later
        // attempt takes the warm path.
        state.model = Some(model);
        state.engine = Some(engine);
        match started {
            Ok(()) => {
                state.started_at = Some(Utc::now());
                state.last_error = None;
                info!("engine started");
                Ok(StartOutcome::Started)
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                Err(ControlError::Start(e))
            }
        }
    }

    pub(crate) async fn stop_locked(
        &self,
        state: &mut RuntimeState,
    ) -> Result<StopOutcome, ControlError> {
        let running = state.engine.as_ref().is_some_and(|e| e.is_running());
        if !running {
            return Ok(StopOutcome::NotRunning);
        }
        state.stopped_at = Some(Utc::now());
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        match engine.stop().await {
            Ok(()) => {
                state.last_error = None;
                info!("engine stopped");
                Ok(StopOutcome::Stopped)
            }
            Err(e) => {
                // The instance handle stays addressable for a later warm
                // restart.
                state.last_error = Some(e.to_string());
                Err(ControlError::Stop(e))
            }
        }
    }

    /// Pick the config file for a cold start: the configured path when it
    /// exists and `reset` is unset, otherwise the path with its last
    /// extension segment stripped, otherwise nothing.
    fn resolve_config_path(&self) -> Option<PathBuf> {
        let mut path = self.options.config_path.clone();
        if path.as_os_str().is_empty() {
            return None;
        }
        if self.options.reset || !path.exists() {
            let fallback = path.with_extension("");
            info!(
                "config file {} unavailable, trying default {}",
                path.display(),
                fallback.display()
            );
            path = fallback;
        }
        path.exists().then_some(path)
    }
}
