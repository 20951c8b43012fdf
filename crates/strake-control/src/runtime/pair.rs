//! Composite bound-pair operations: one tag, three independent mutations.
//!
//! All three legs are attempted even when an earlier one fails, and their
//! failures are aggregated into a single report. Nothing is rolled back:
//! recovering from a partially applied pair means issuing the matching
//! removals explicitly.

use super::state::Runtime;
use crate::config::{InboundSpec, OutboundSpec};
use crate::error::{ControlError, PairFailure};
use serde_json::json;
use tracing::warn;

impl Runtime {
    /// Add an outbound, an inbound, and the route binding them, all under
    /// one tag.
    pub async fn add_bound_pair(
        &self,
        inbound: InboundSpec,
        outbound: OutboundSpec,
    ) -> Result<(), ControlError> {
        if inbound.tag != outbound.tag {
            return Err(ControlError::TagMismatch {
                inbound: inbound.tag,
                outbound: outbound.tag,
            });
        }
        let tag = inbound.tag.clone();
        let route = json!({ "tag": &tag, "target": &tag, "inbounds": [&tag] });
        let outbound_err = self.add_outbound(outbound, true).await.err();
        let inbound_err = self.add_inbound(inbound, true).await.err();
        let route_err = self.add_route(route, true).await.err();
        aggregate(tag, outbound_err, inbound_err, route_err)
    }

    /// Remove the outbound, inbound, and route sharing a tag.
    pub async fn remove_bound_pair(&self, tag: &str) -> Result<(), ControlError> {
        let outbound_err = self.remove_outbound(tag, true).await.err();
        let inbound_err = self.remove_inbound(tag, true).await.err();
        let route_err = self.remove_route(tag, true).await.err();
        aggregate(tag.to_string(), outbound_err, inbound_err, route_err)
    }
}

fn aggregate(
    tag: String,
    outbound: Option<ControlError>,
    inbound: Option<ControlError>,
    route: Option<ControlError>,
) -> Result<(), ControlError> {
    if outbound.is_none() && inbound.is_none() && route.is_none() {
        return Ok(());
    }
    let failure = PairFailure {
        tag,
        outbound: outbound.map(|e| e.to_string()),
        inbound: inbound.map(|e| e.to_string()),
        route: route.map(|e| e.to_string()),
    };
    warn!("bound pair operation partially failed: {}", failure);
    Err(ControlError::Pair(failure))
}
