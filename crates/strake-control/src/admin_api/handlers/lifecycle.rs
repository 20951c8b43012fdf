//! Lifecycle handlers: start, stop, restart, save.

use crate::admin_api::types::{query_param, Envelope};
use crate::runtime::{Runtime, StartOutcome, StopOutcome};

pub async fn start(runtime: &Runtime) -> Envelope {
    match runtime.start().await {
        Ok(StartOutcome::Started) => Envelope::ok(),
        Ok(StartOutcome::AlreadyRunning) => Envelope::ok_with_message("engine is already running"),
        Err(e) => Envelope::from_error(&e),
    }
}

pub async fn stop(runtime: &Runtime) -> Envelope {
    match runtime.stop().await {
        Ok(StopOutcome::Stopped) => Envelope::ok(),
        Ok(StopOutcome::NotRunning) => Envelope::ok_with_message("engine is not running"),
        Err(e) => Envelope::from_error(&e),
    }
}

pub async fn restart(query: Option<&str>, runtime: &Runtime) -> Envelope {
    let reload = query_param(query, "reload").map(|v| v == "true").unwrap_or(false);
    match runtime.restart(reload).await {
        Ok(_) => Envelope::ok(),
        Err(e) => Envelope::from_error(&e),
    }
}

pub async fn save(runtime: &Runtime) -> Envelope {
    match runtime.save().await {
        Ok(()) => Envelope::ok(),
        Err(e) => Envelope::from_error(&e),
    }
}
