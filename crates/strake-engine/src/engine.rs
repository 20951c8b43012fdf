//! The engine instance: lifecycle and feature managers.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::inbound::InboundManager;
use crate::outbound::OutboundManager;
use crate::router::Router;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// A relay engine instance. Created once per cold start and reusable across
/// stop/start cycles; dropped only when the owner discards it.
pub struct Engine {
    inbounds: Arc<InboundManager>,
    outbounds: Arc<OutboundManager>,
    router: Arc<Router>,
    running: Arc<AtomicBool>,
}

impl Engine {
    /// Instantiate from an engine-native config. Fails on duplicate tags;
    /// nothing is bound until `start`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        check_unique(config.inbounds.iter().map(|c| c.tag.as_str()))?;
        check_unique(config.outbounds.iter().map(|c| c.tag.as_str()))?;
        check_unique(
            config
                .rules
                .iter()
                .map(|r| r.tag.as_str())
                .filter(|t| !t.is_empty()),
        )?;
        let running = Arc::new(AtomicBool::new(false));
        let outbounds = Arc::new(OutboundManager::new(config.outbounds));
        let router = Arc::new(Router::new(config.rules));
        let inbounds = Arc::new(InboundManager::new(
            config.inbounds,
            Arc::clone(&outbounds),
            Arc::clone(&router),
            Arc::clone(&running),
        ));
        Ok(Self {
            inbounds,
            outbounds,
            router,
            running,
        })
    }

    /// Bind every registered inbound and begin serving. A no-op when
    /// already running.
    pub async fn start(&self) -> Result<(), EngineError> {
        if self.is_running() {
            return Ok(());
        }
        self.inbounds.start_all().await?;
        self.running.store(true, Ordering::SeqCst);
        info!(
            "engine started: {} inbound(s), {} outbound(s), {} rule(s)",
            self.inbounds.list().len(),
            self.outbounds.list().len(),
            self.router.list().len()
        );
        Ok(())
    }

    /// Release every socket while keeping all registrations, so a later
    /// `start` rebinds them.
    pub async fn stop(&self) -> Result<(), EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }
        self.running.store(false, Ordering::SeqCst);
        self.inbounds.stop_all().await;
        info!("engine stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn inbound_manager(&self) -> &InboundManager {
        &self.inbounds
    }

    pub fn outbound_manager(&self) -> &OutboundManager {
        &self.outbounds
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

fn check_unique<'a>(tags: impl Iterator<Item = &'a str>) -> Result<(), EngineError> {
    let mut seen = Vec::new();
    for tag in tags {
        if seen.contains(&tag) {
            return Err(EngineError::TagInUse(tag.to_string()));
        }
        seen.push(tag);
    }
    Ok(())
}
