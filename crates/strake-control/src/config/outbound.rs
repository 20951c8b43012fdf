//! Declarative connector description.

use crate::error::ControlError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strake_engine::{OutboundHandlerConfig, OutboundKind};

/// Declarative description of a connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundSpec {
    pub tag: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub settings: Value,
}

#[derive(Debug, Deserialize)]
struct DirectSettings {
    address: String,
    port: u16,
}

impl OutboundSpec {
    pub fn build(&self) -> Result<OutboundHandlerConfig, ControlError> {
        if self.tag.is_empty() {
            return Err(ControlError::Build("outbound tag must not be empty".to_string()));
        }
        let kind = match self.protocol.as_str() {
            "direct" => {
                let settings: DirectSettings = serde_json::from_value(self.settings.clone())
                    .map_err(|e| {
                        ControlError::Build(format!("outbound '{}': {}", self.tag, e))
                    })?;
                OutboundKind::Direct {
                    address: settings.address,
                    port: settings.port,
                }
            }
            "blackhole" => OutboundKind::Blackhole,
            other => {
                return Err(ControlError::Build(format!(
                    "outbound '{}': unsupported protocol '{}'",
                    self.tag, other
                )))
            }
        };
        Ok(OutboundHandlerConfig {
            tag: self.tag.clone(),
            kind,
        })
    }
}
