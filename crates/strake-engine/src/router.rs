//! Ordered routing rules binding inbound tags to outbound targets.

use crate::config::RoutingRule;
use crate::error::EngineError;
use parking_lot::RwLock;

pub struct Router {
    rules: RwLock<Vec<RoutingRule>>,
}

impl Router {
    pub(crate) fn new(rules: Vec<RoutingRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// Install a rule. `high_priority` inserts it before existing rules so
    /// it wins over previously installed ones. Tagged rules must be unique;
    /// anonymous rules (empty tag) are not checked.
    pub fn add_rule(&self, rule: RoutingRule, high_priority: bool) -> Result<(), EngineError> {
        let mut rules = self.rules.write();
        if !rule.tag.is_empty() && rules.iter().any(|r| r.tag == rule.tag) {
            return Err(EngineError::TagInUse(rule.tag));
        }
        if high_priority {
            rules.insert(0, rule);
        } else {
            rules.push(rule);
        }
        Ok(())
    }

    /// Remove a rule by tag.
    pub fn remove_rule(&self, tag: &str) -> Result<(), EngineError> {
        let mut rules = self.rules.write();
        match rules.iter().position(|r| r.tag == tag) {
            Some(idx) => {
                rules.remove(idx);
                Ok(())
            }
            None => Err(EngineError::NotFound(tag.to_string())),
        }
    }

    /// Rule tags in evaluation order.
    pub fn list(&self) -> Vec<String> {
        self.rules.read().iter().map(|r| r.tag.clone()).collect()
    }

    /// First matching rule decides the outbound target.
    pub(crate) fn pick(&self, inbound_tag: &str) -> Option<String> {
        self.rules
            .read()
            .iter()
            .find(|r| r.matches(inbound_tag))
            .map(|r| r.target.clone())
    }
}
