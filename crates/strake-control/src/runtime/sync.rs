//! Entity synchronizer: incremental add/remove with the engine as
//! write-ahead authority.
//!
//! Shared shape of every operation: when persisting, the model-level tag
//! check runs first so a rejected request never reaches the engine; the
//! engine mutation runs next; the model is touched last and only on engine
//! success.

use super::state::Runtime;
use crate::config::{InboundSpec, OutboundSpec, RouteRule};
use crate::error::ControlError;
use serde_json::Value;
use tracing::info;

impl Runtime {
    pub async fn add_inbound(&self, spec: InboundSpec, persist: bool) -> Result<(), ControlError> {
        let mut state = self.state.lock().await;
        let model = state.model.as_ref().ok_or(ControlError::Uninitialized)?;
        if persist && model.find_inbound(&spec.tag).is_some() {
            return Err(ControlError::DuplicateTag(spec.tag));
        }
        let handler = spec.build()?;
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        engine
            .inbound_manager()
            .add(handler)
            .await
            .map_err(ControlError::EngineRejected)?;
        info!("inbound '{}' added (persist: {})", spec.tag, persist);
        if persist {
            if let Some(model) = state.model.as_mut() {
                model.inbounds.push(spec);
            }
        }
        Ok(())
    }

    pub async fn remove_inbound(&self, tag: &str, persist: bool) -> Result<(), ControlError> {
        let mut state = self.state.lock().await;
        let model = state.model.as_ref().ok_or(ControlError::Uninitialized)?;
        let idx = if persist {
            match model.find_inbound(tag) {
                Some(idx) => Some(idx),
                None => return Err(ControlError::NotFound(tag.to_string())),
            }
        } else {
            None
        };
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        engine
            .inbound_manager()
            .remove(tag)
            .await
            .map_err(ControlError::EngineRejected)?;
        info!("inbound '{}' removed (persist: {})", tag, persist);
        if let (Some(idx), Some(model)) = (idx, state.model.as_mut()) {
            model.inbounds.remove(idx);
        }
        Ok(())
    }

    pub async fn add_outbound(
        &self,
        spec: OutboundSpec,
        persist: bool,
    ) -> Result<(), ControlError> {
        let mut state = self.state.lock().await;
        let model = state.model.as_ref().ok_or(ControlError::Uninitialized)?;
        if persist && model.find_outbound(&spec.tag).is_some() {
            return Err(ControlError::DuplicateTag(spec.tag));
        }
        let handler = spec.build()?;
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        engine
            .outbound_manager()
            .add(handler)
            .map_err(ControlError::EngineRejected)?;
        info!("outbound '{}' added (persist: {})", spec.tag, persist);
        if persist {
            if let Some(model) = state.model.as_mut() {
                model.outbounds.push(spec);
            }
        }
        Ok(())
    }

    pub async fn remove_outbound(&self, tag: &str, persist: bool) -> Result<(), ControlError> {
        let mut state = self.state.lock().await;
        let model = state.model.as_ref().ok_or(ControlError::Uninitialized)?;
        let idx = if persist {
            match model.find_outbound(tag) {
                Some(idx) => Some(idx),
                None => return Err(ControlError::NotFound(tag.to_string())),
            }
        } else {
            None
        };
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        engine
            .outbound_manager()
            .remove(tag)
            .map_err(ControlError::EngineRejected)?;
        info!("outbound '{}' removed (persist: {})", tag, persist);
        if let (Some(idx), Some(model)) = (idx, state.model.as_mut()) {
            model.outbounds.remove(idx);
        }
        Ok(())
    }

    /// Install a routing rule from a raw document. New rules take priority
    /// over previously installed ones.
    pub async fn add_route(&self, doc: Value, persist: bool) -> Result<(), ControlError> {
        let mut state = self.state.lock().await;
        let model = state.model.as_ref().ok_or(ControlError::Uninitialized)?;
        let rule = RouteRule::parse(&doc)?;
        if persist {
            if rule.tag.is_empty() {
                return Err(ControlError::MissingTag);
            }
            if model.find_route(&rule.tag).is_some() {
                return Err(ControlError::DuplicateTag(rule.tag));
            }
        }
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        engine
            .router()
            .add_rule(rule.build(), true)
            .map_err(ControlError::EngineRejected)?;
        info!("route '{}' added (persist: {})", rule.tag, persist);
        if persist {
            if let Some(model) = state.model.as_mut() {
                model.routes.push(doc);
            }
        }
        Ok(())
    }

    pub async fn remove_route(&self, tag: &str, persist: bool) -> Result<(), ControlError> {
        let mut state = self.state.lock().await;
        let model = state.model.as_ref().ok_or(ControlError::Uninitialized)?;
        let idx = if persist {
            match model.find_route(tag) {
                Some(idx) => Some(idx),
                None => return Err(ControlError::NotFound(tag.to_string())),
            }
        } else {
            None
        };
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        engine
            .router()
            .remove_rule(tag)
            .map_err(ControlError::EngineRejected)?;
        info!("route '{}' removed (persist: {})", tag, persist);
        if let (Some(idx), Some(model)) = (idx, state.model.as_mut()) {
            model.routes.remove(idx);
        }
        Ok(())
    }

    /// Live engine tag list; the model should already agree with it, so the
    /// pair serves as a reconciliation view.
    pub async fn list_inbounds(&self) -> Result<Vec<String>, ControlError> {
        let state = self.state.lock().await;
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        Ok(engine.inbound_manager().list())
    }

    pub async fn list_outbounds(&self) -> Result<Vec<String>, ControlError> {
        let state = self.state.lock().await;
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        Ok(engine.outbound_manager().list())
    }

    pub async fn list_routes(&self) -> Result<Vec<String>, ControlError> {
        let state = self.state.lock().await;
        let engine = state.engine.as_ref().ok_or(ControlError::Uninitialized)?;
        Ok(engine.router().list())
    }
}
