//! System handlers: health and the statistics stub.

use crate::admin_api::types::Envelope;
use chrono::Utc;

/// Liveness probe; the one action reachable with GET.
pub fn healthz() -> Envelope {
    Envelope::ok_with_data(serde_json::json!(
        Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
    ))
}

/// System statistics are not collected. The action is kept as an explicit
/// stub so callers get a well-formed reply instead of an unknown action.
pub fn system_stats() -> Envelope {
    let mut envelope = Envelope::ok_with_message("system statistics are not implemented");
    envelope.data = Some(serde_json::json!({}));
    envelope
}
