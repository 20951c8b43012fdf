//! Response envelope and small request helpers.

use crate::error::ControlError;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Uniform response envelope. Transport status is always 200; the outcome
/// lives in the body.
#[derive(Debug, Serialize, Default)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn ok_with_data(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            errcode: Some(code.to_string()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn from_error(err: &ControlError) -> Self {
        Self::error(err.code(), err.to_string())
    }
}

/// Serialize an envelope into an HTTP response.
pub fn envelope_response(envelope: &Envelope) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(envelope).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("{}"))))
}

/// Collect the request body into bytes.
pub async fn collect_body(req: Request<Incoming>) -> Result<Bytes, String> {
    req.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("failed to read request body: {e}"))
}

/// Single-value query parameter lookup.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
