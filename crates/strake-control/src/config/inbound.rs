//! Declarative listener description.

use crate::error::ControlError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strake_engine::InboundHandlerConfig;

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

/// Declarative description of a listener. Owned by the config model; the
/// engine-native handler built from it is owned by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundSpec {
    pub tag: String,
    pub protocol: String,
    #[serde(default = "default_listen")]
    pub listen: String,
    pub port: u16,
    /// Protocol settings, opaque to the control plane.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub settings: Value,
}

impl InboundSpec {
    /// Validate the declarative form and produce the engine-native handler
    /// config.
    pub fn build(&self) -> Result<InboundHandlerConfig, ControlError> {
        if self.tag.is_empty() {
            return Err(ControlError::Build("inbound tag must not be empty".to_string()));
        }
        if self.protocol != "tcp" {
            return Err(ControlError::Build(format!(
                "inbound '{}': unsupported protocol '{}'",
                self.tag, self.protocol
            )));
        }
        if self.port == 0 {
            return Err(ControlError::Build(format!(
                "inbound '{}' must declare a nonzero port",
                self.tag
            )));
        }
        Ok(InboundHandlerConfig {
            tag: self.tag.clone(),
            listen: self.listen.clone(),
            port: self.port,
        })
    }
}
