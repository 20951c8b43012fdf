//! Outbound manager: an ordered registry of connectors addressed by tag.

use crate::config::OutboundHandlerConfig;
use crate::error::EngineError;
use parking_lot::RwLock;

pub struct OutboundManager {
    handlers: RwLock<Vec<OutboundHandlerConfig>>,
}

impl OutboundManager {
    pub(crate) fn new(configs: Vec<OutboundHandlerConfig>) -> Self {
        Self {
            handlers: RwLock::new(configs),
        }
    }

    /// Register a connector. Rejects duplicate tags.
    pub fn add(&self, config: OutboundHandlerConfig) -> Result<(), EngineError> {
        let mut handlers = self.handlers.write();
        if handlers.iter().any(|h| h.tag == config.tag) {
            return Err(EngineError::TagInUse(config.tag));
        }
        handlers.push(config);
        Ok(())
    }

    /// Remove a connector by tag, preserving the order of the rest.
    pub fn remove(&self, tag: &str) -> Result<(), EngineError> {
        let mut handlers = self.handlers.write();
        match handlers.iter().position(|h| h.tag == tag) {
            Some(idx) => {
                handlers.remove(idx);
                Ok(())
            }
            None => Err(EngineError::NotFound(tag.to_string())),
        }
    }

    /// Registered tags in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.handlers.read().iter().map(|h| h.tag.clone()).collect()
    }

    pub(crate) fn get(&self, tag: &str) -> Option<OutboundHandlerConfig> {
        self.handlers.read().iter().find(|h| h.tag == tag).cloned()
    }

    /// Fallback when no routing rule matches: the first registered outbound.
    pub(crate) fn first(&self) -> Option<OutboundHandlerConfig> {
        self.handlers.read().first().cloned()
    }
}
