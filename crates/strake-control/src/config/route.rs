//! Interpreted portion of a stored route document.

use crate::error::ControlError;
use serde::Deserialize;
use serde_json::Value;
use strake_engine::RoutingRule;

/// The fields the control plane interprets in a route document. Everything
/// else in the document is opaque and preserved verbatim in the model.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRule {
    #[serde(default)]
    pub tag: String,
    /// Tag of the outbound the rule selects.
    pub target: String,
    /// Inbound tags the rule binds to. Empty matches every inbound.
    #[serde(default)]
    pub inbounds: Vec<String>,
}

impl RouteRule {
    pub fn parse(doc: &Value) -> Result<Self, ControlError> {
        serde_json::from_value(doc.clone()).map_err(|e| ControlError::InvalidRoute(e.to_string()))
    }

    pub fn build(&self) -> RoutingRule {
        RoutingRule {
            tag: self.tag.clone(),
            target: self.target.clone(),
            inbound_tags: self.inbounds.clone(),
        }
    }
}
