//! Entity add/remove/list handlers.

use crate::admin_api::types::{collect_body, query_param, Envelope};
use crate::config::{InboundSpec, OutboundSpec};
use crate::runtime::Runtime;
use hyper::body::Incoming;
use hyper::Request;
use serde::Deserialize;
use serde_json::Value;

fn persist_flag(query: Option<&str>) -> bool {
    query_param(query, "persist").map(|v| v != "false").unwrap_or(true)
}

fn tag_param(query: Option<&str>) -> Result<String, Envelope> {
    match query_param(query, "tag") {
        Some(tag) if !tag.is_empty() => Ok(tag),
        _ => Err(Envelope::error("invalid_tag", "missing tag parameter")),
    }
}

async fn decode_body<T: for<'de> Deserialize<'de>>(
    req: Request<Incoming>,
    what: &str,
) -> Result<T, Envelope> {
    let body = collect_body(req)
        .await
        .map_err(|e| Envelope::error("invalid_data", e))?;
    serde_json::from_slice(&body)
        .map_err(|e| Envelope::error("invalid_json", format!("invalid {what} JSON: {e}")))
}

fn finish(result: Result<(), crate::error::ControlError>) -> Envelope {
    match result {
        Ok(()) => Envelope::ok(),
        Err(e) => Envelope::from_error(&e),
    }
}

pub async fn add_inbound(query: Option<&str>, req: Request<Incoming>, runtime: &Runtime) -> Envelope {
    let spec: InboundSpec = match decode_body(req, "inbound").await {
        Ok(spec) => spec,
        Err(envelope) => return envelope,
    };
    finish(runtime.add_inbound(spec, persist_flag(query)).await)
}

pub async fn remove_inbound(query: Option<&str>, runtime: &Runtime) -> Envelope {
    let tag = match tag_param(query) {
        Ok(tag) => tag,
        Err(envelope) => return envelope,
    };
    finish(runtime.remove_inbound(&tag, persist_flag(query)).await)
}

pub async fn list_inbounds(runtime: &Runtime) -> Envelope {
    match runtime.list_inbounds().await {
        Ok(tags) => Envelope::ok_with_data(serde_json::json!(tags)),
        Err(e) => Envelope::from_error(&e),
    }
}

pub async fn add_outbound(
    query: Option<&str>,
    req: Request<Incoming>,
    runtime: &Runtime,
) -> Envelope {
    let spec: OutboundSpec = match decode_body(req, "outbound").await {
        Ok(spec) => spec,
        Err(envelope) => return envelope,
    };
    finish(runtime.add_outbound(spec, persist_flag(query)).await)
}

pub async fn remove_outbound(query: Option<&str>, runtime: &Runtime) -> Envelope {
    let tag = match tag_param(query) {
        Ok(tag) => tag,
        Err(envelope) => return envelope,
    };
    finish(runtime.remove_outbound(&tag, persist_flag(query)).await)
}

pub async fn list_outbounds(runtime: &Runtime) -> Envelope {
    match runtime.list_outbounds().await {
        Ok(tags) => Envelope::ok_with_data(serde_json::json!(tags)),
        Err(e) => Envelope::from_error(&e),
    }
}

pub async fn add_route(query: Option<&str>, req: Request<Incoming>, runtime: &Runtime) -> Envelope {
    let doc: Value = match decode_body(req, "route").await {
        Ok(doc) => doc,
        Err(envelope) => return envelope,
    };
    finish(runtime.add_route(doc, persist_flag(query)).await)
}

pub async fn remove_route(query: Option<&str>, runtime: &Runtime) -> Envelope {
    let tag = match tag_param(query) {
        Ok(tag) => tag,
        Err(envelope) => return envelope,
    };
    finish(runtime.remove_route(&tag, persist_flag(query)).await)
}

pub async fn list_routes(runtime: &Runtime) -> Envelope {
    match runtime.list_routes().await {
        Ok(tags) => Envelope::ok_with_data(serde_json::json!(tags)),
        Err(e) => Envelope::from_error(&e),
    }
}

/// Body of a bound-pair add: one inbound and one outbound sharing a tag.
#[derive(Debug, Deserialize)]
struct PairBody {
    inbound: InboundSpec,
    outbound: OutboundSpec,
}

pub async fn add_pair(req: Request<Incoming>, runtime: &Runtime) -> Envelope {
    let body: PairBody = match decode_body(req, "pair").await {
        Ok(body) => body,
        Err(envelope) => return envelope,
    };
    finish(runtime.add_bound_pair(body.inbound, body.outbound).await)
}

pub async fn remove_pair(query: Option<&str>, runtime: &Runtime) -> Envelope {
    let tag = match tag_param(query) {
        Ok(tag) => tag,
        Err(envelope) => return envelope,
    };
    finish(runtime.remove_bound_pair(&tag).await)
}
