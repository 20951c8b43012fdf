//! Action dispatch for the admin API.
//!
//! The action is resolved from the `action` query parameter, falling back
//! to the URL path with its leading slash stripped. Only `healthz` may be
//! fetched with GET; every other action mutates or inspects runtime state
//! and requires POST.

use super::handlers::{entities, lifecycle, system};
use super::server::AdminContext;
use super::types::{envelope_response, query_param, Envelope};
use crate::runtime::Runtime;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use std::sync::Arc;
use tracing::debug;

/// Main request entry: token gate, action resolution, dispatch.
pub async fn route_request(
    req: Request<Incoming>,
    context: Arc<AdminContext>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    if let Some(expected) = context.token.as_deref() {
        let presented = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok());
        if presented != Some(format!("Token {expected}").as_str()) {
            return Ok(envelope_response(&Envelope::error(
                "invalid_token",
                "invalid access token",
            )));
        }
    }

    let query = req.uri().query().map(|s| s.to_string());
    let action = query_param(query.as_deref(), "action")
        .unwrap_or_else(|| req.uri().path().trim_start_matches('/').to_string());
    if action.is_empty() {
        return Ok(envelope_response(&Envelope::error(
            "empty_action",
            "no action requested",
        )));
    }
    debug!("admin request: {} {}", req.method(), action);

    if req.method() != Method::POST && action != "healthz" {
        return Ok(envelope_response(&Envelope::error(
            "invalid_method",
            "only POST is accepted",
        )));
    }

    let envelope = dispatch(&action, query.as_deref(), req, &context.runtime).await;
    Ok(envelope_response(&envelope))
}

async fn dispatch(
    action: &str,
    query: Option<&str>,
    req: Request<Incoming>,
    runtime: &Runtime,
) -> Envelope {
    match action {
        "healthz" => system::healthz(),
        "stats.system" => system::system_stats(),

        "inbound.add" => entities::add_inbound(query, req, runtime).await,
        "inbound.remove" => entities::remove_inbound(query, runtime).await,
        "inbound.list" => entities::list_inbounds(runtime).await,

        "outbound.add" => entities::add_outbound(query, req, runtime).await,
        "outbound.remove" => entities::remove_outbound(query, runtime).await,
        "outbound.list" => entities::list_outbounds(runtime).await,

        "route.add" => entities::add_route(query, req, runtime).await,
        "route.remove" => entities::remove_route(query, runtime).await,
        "route.list" => entities::list_routes(runtime).await,

        "pair.add" => entities::add_pair(req, runtime).await,
        "pair.remove" => entities::remove_pair(query, runtime).await,

        "engine.start" => lifecycle::start(runtime).await,
        "engine.stop" => lifecycle::stop(runtime).await,
        "engine.restart" => lifecycle::restart(query, runtime).await,
        "config.save" => lifecycle::save(runtime).await,

        _ => Envelope::error("invalid_action", format!("unknown action: {action}")),
    }
}
