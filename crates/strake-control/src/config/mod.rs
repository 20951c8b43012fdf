//! Declarative configuration model.
//!
//! Three ordered sequences (inbounds, outbounds, routes), each keyed by
//! unique tag with insertion order preserved in memory and on disk. The
//! model trails the live engine: entries are appended or spliced only after
//! the engine accepted the corresponding mutation.

mod inbound;
mod outbound;
mod route;

pub use inbound::InboundSpec;
pub use outbound::OutboundSpec;
pub use route::RouteRule;

use crate::error::ControlError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use strake_engine::EngineConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigModel {
    pub inbounds: Vec<InboundSpec>,
    pub outbounds: Vec<OutboundSpec>,
    /// Route documents are stored raw; only `tag`, `target` and `inbounds`
    /// are interpreted.
    pub routes: Vec<Value>,
}

impl ConfigModel {
    pub fn load(path: &Path) -> Result<Self, ControlError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ControlError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ControlError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the model as pretty-printed JSON, preserving sequence order.
    pub fn save(&self, path: &Path) -> Result<(), ControlError> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| ControlError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, contents).map_err(|e| ControlError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn find_inbound(&self, tag: &str) -> Option<usize> {
        self.inbounds.iter().position(|spec| spec.tag == tag)
    }

    pub fn find_outbound(&self, tag: &str) -> Option<usize> {
        self.outbounds.iter().position(|spec| spec.tag == tag)
    }

    /// Linear scan over the stored route documents. Documents that fail to
    /// parse are skipped, not treated as fatal: a malformed stored document
    /// must not masquerade as "tag not found" for the rest.
    pub fn find_route(&self, tag: &str) -> Option<usize> {
        self.routes.iter().enumerate().find_map(|(idx, doc)| {
            match RouteRule::parse(doc) {
                Ok(rule) if rule.tag == tag => Some(idx),
                _ => None,
            }
        })
    }

    /// Build the engine-native configuration for a cold start. Unlike tag
    /// lookup, a cold start must not silently drop malformed route
    /// documents.
    pub fn build(&self) -> Result<EngineConfig, ControlError> {
        let mut config = EngineConfig::default();
        for spec in &self.inbounds {
            config.inbounds.push(spec.build()?);
        }
        for spec in &self.outbounds {
            config.outbounds.push(spec.build()?);
        }
        for (idx, doc) in self.routes.iter().enumerate() {
            let rule = RouteRule::parse(doc)
                .map_err(|e| ControlError::Build(format!("route {idx}: {e}")))?;
            config.rules.push(rule.build());
        }
        Ok(config)
    }
}
