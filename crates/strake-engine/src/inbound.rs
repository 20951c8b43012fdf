//! Inbound manager: listening sockets with per-handler accept loops.
//!
//! Registrations and live listeners are tracked separately: a handler keeps
//! its registration across an engine stop, so a later start rebinds it.

use crate::config::InboundHandlerConfig;
use crate::error::EngineError;
use crate::outbound::OutboundManager;
use crate::relay;
use crate::router::Router;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Live side of a bound handler.
struct HandlerRuntime {
    shutdown_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

struct InboundHandler {
    config: InboundHandlerConfig,
    /// Present while the accept loop is live.
    runtime: Option<HandlerRuntime>,
}

pub struct InboundManager {
    handlers: RwLock<Vec<InboundHandler>>,
    outbounds: Arc<OutboundManager>,
    router: Arc<Router>,
    running: Arc<AtomicBool>,
}

impl InboundManager {
    pub(crate) fn new(
        configs: Vec<InboundHandlerConfig>,
        outbounds: Arc<OutboundManager>,
        router: Arc<Router>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let handlers = configs
            .into_iter()
            .map(|config| InboundHandler {
                config,
                runtime: None,
            })
            .collect();
        Self {
            handlers: RwLock::new(handlers),
            outbounds,
            router,
            running,
        }
    }

    /// Register a listener and, when the engine is running, bind and serve
    /// it immediately.
    pub async fn add(&self, config: InboundHandlerConfig) -> Result<(), EngineError> {
        if self
            .handlers
            .read()
            .iter()
            .any(|h| h.config.tag == config.tag)
        {
            return Err(EngineError::TagInUse(config.tag));
        }
        let runtime = if self.running.load(Ordering::SeqCst) {
            Some(self.spawn_handler(&config).await?)
        } else {
            None
        };
        self.handlers.write().push(InboundHandler { config, runtime });
        Ok(())
    }

    /// Shut a listener down and drop its registration. Waits for the accept
    /// loop to exit so the port is released on return.
    pub async fn remove(&self, tag: &str) -> Result<(), EngineError> {
        let handler = {
            let mut handlers = self.handlers.write();
            match handlers.iter().position(|h| h.config.tag == tag) {
                Some(idx) => handlers.remove(idx),
                None => return Err(EngineError::NotFound(tag.to_string())),
            }
        };
        if let Some(runtime) = handler.runtime {
            let _ = runtime.shutdown_tx.send(());
            let _ = runtime.join.await;
        }
        Ok(())
    }

    /// Registered tags in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.handlers
            .read()
            .iter()
            .map(|h| h.config.tag.clone())
            .collect()
    }

    /// Bind every registered handler. On failure the ones already bound are
    /// shut down again, leaving the manager fully stopped.
    pub(crate) async fn start_all(&self) -> Result<(), EngineError> {
        let configs: Vec<InboundHandlerConfig> = self
            .handlers
            .read()
            .iter()
            .filter(|h| h.runtime.is_none())
            .map(|h| h.config.clone())
            .collect();
        let mut spawned = Vec::new();
        for config in configs {
            match self.spawn_handler(&config).await {
                Ok(runtime) => spawned.push((config.tag, runtime)),
                Err(e) => {
                    for (_, runtime) in spawned {
                        let _ = runtime.shutdown_tx.send(());
                        let _ = runtime.join.await;
                    }
                    return Err(e);
                }
            }
        }
        let mut handlers = self.handlers.write();
        for (tag, runtime) in spawned {
            if let Some(handler) = handlers.iter_mut().find(|h| h.config.tag == tag) {
                handler.runtime = Some(runtime);
            }
        }
        Ok(())
    }

    /// Shut every live listener down, keeping the registrations.
    pub(crate) async fn stop_all(&self) {
        let live: Vec<HandlerRuntime> = {
            let mut handlers = self.handlers.write();
            handlers.iter_mut().filter_map(|h| h.runtime.take()).collect()
        };
        for runtime in &live {
            let _ = runtime.shutdown_tx.send(());
        }
        for runtime in live {
            let _ = runtime.join.await;
        }
    }

    async fn spawn_handler(
        &self,
        config: &InboundHandlerConfig,
    ) -> Result<HandlerRuntime, EngineError> {
        let listener = TcpListener::bind((config.listen.as_str(), config.port))
            .await
            .map_err(|e| EngineError::Bind {
                port: config.port,
                reason: e.to_string(),
            })?;
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let tag = config.tag.clone();
        let port = config.port;
        let outbounds = Arc::clone(&self.outbounds);
        let router = Arc::clone(&self.router);
        info!("inbound '{}' listening on {}:{}", tag, config.listen, port);
        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, addr)) => {
                                let outbounds = Arc::clone(&outbounds);
                                let router = Arc::clone(&router);
                                let tag = tag.clone();
                                tokio::spawn(async move {
                                    if let Err(e) =
                                        relay::dispatch(stream, &tag, &router, &outbounds).await
                                    {
                                        debug!(
                                            "connection from {} on '{}' closed: {}",
                                            addr, tag, e
                                        );
                                    }
                                });
                            }
                            Err(e) => {
                                error!("accept error on port {}: {}", port, e);
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("inbound '{}' on port {} shutting down", tag, port);
                        break;
                    }
                }
            }
        });
        Ok(HandlerRuntime { shutdown_tx, join })
    }
}
