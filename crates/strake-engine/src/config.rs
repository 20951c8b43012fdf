//! Engine-native configuration objects.
//!
//! These are the already-validated forms handed to the engine by its caller.
//! Building them from declarative descriptions is the caller's concern; the
//! engine only checks what it cannot delegate (tag uniqueness at
//! instantiation, bindability at start).

/// A TCP listener registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundHandlerConfig {
    pub tag: String,
    pub listen: String,
    pub port: u16,
}

/// Connector semantics for an outbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundKind {
    /// Dial the target and relay bytes both ways.
    Direct { address: String, port: u16 },
    /// Accept and silently drop the connection.
    Blackhole,
}

/// A connector registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundHandlerConfig {
    pub tag: String,
    pub kind: OutboundKind,
}

/// A routing rule binding inbound tags to an outbound target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    /// Rule tag, used for removal. May be empty for anonymous rules.
    pub tag: String,
    /// Tag of the outbound the rule selects.
    pub target: String,
    /// Inbound tags the rule applies to. Empty matches every inbound.
    pub inbound_tags: Vec<String>,
}

impl RoutingRule {
    /// Whether this rule applies to a connection accepted on `inbound_tag`.
    pub fn matches(&self, inbound_tag: &str) -> bool {
        self.inbound_tags.is_empty() || self.inbound_tags.iter().any(|t| t == inbound_tag)
    }
}

/// Full engine-native configuration used at instantiation.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub inbounds: Vec<InboundHandlerConfig>,
    pub outbounds: Vec<OutboundHandlerConfig>,
    pub rules: Vec<RoutingRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_with_inbound_tags_matches_only_those() {
        let rule = RoutingRule {
            tag: "r".to_string(),
            target: "out".to_string(),
            inbound_tags: vec!["a".to_string(), "b".to_string()],
        };
        assert!(rule.matches("a"));
        assert!(rule.matches("b"));
        assert!(!rule.matches("c"));
    }

    #[test]
    fn rule_without_inbound_tags_matches_everything() {
        let rule = RoutingRule {
            tag: "r".to_string(),
            target: "out".to_string(),
            inbound_tags: vec![],
        };
        assert!(rule.matches("anything"));
    }
}
